use faq_engine::{
    BuildError, Corpus, EmbeddingConfig, EngineError, LexicalIndex, RetrievalEngine,
    SemanticIndex, TfIdfIndex, Word2VecIndex,
};

fn shop_corpus() -> Corpus {
    Corpus::from(vec![
        ("How do I reset my password?", "Use the reset link on the login page."),
        ("What are your business hours?", "We are open 9am–6pm."),
        ("How do I track my order?", "Open the tracking page from your account."),
        ("Can I return an item?", "Returns are accepted within 30 days."),
        ("Do you ship abroad?", "We ship to most countries."),
        ("How can I change my delivery address?", "Edit it under account settings."),
    ])
}

fn config() -> EmbeddingConfig {
    EmbeddingConfig {
        dimensionality: 100,
        epochs: 10,
        ..Default::default()
    }
}

#[test]
fn best_matches_stay_in_range() {
    let corpus = shop_corpus();
    let n = corpus.len();
    let engine = RetrievalEngine::initialize(corpus, &config()).expect("init");

    for query in [
        "password",
        "when are you open",
        "parcel abroad shipping",
        "???",
        "refund my item please",
        "совсем другой язык",
    ] {
        let result = engine.answer(query).expect("answer");
        assert!(result.lexical.matched_index < n);
        assert!(result.semantic.matched_index < n);
        assert!((-1.0..=1.0).contains(&result.lexical.score));
        assert!((-1.0..=1.0).contains(&result.semantic.score));
    }
}

#[test]
fn every_stored_question_finds_itself_lexically() {
    let corpus = shop_corpus();
    let questions = corpus.questions();
    let index = TfIdfIndex::build(&questions).expect("build");

    for (i, q) in questions.iter().enumerate() {
        let (best, score) = index.best_match(q);
        assert_eq!(best, i, "question {q:?}");
        assert!((score - 1.0).abs() < 1e-5);
    }
}

#[test]
fn out_of_vocabulary_query_scores_zero_everywhere() {
    let corpus = shop_corpus();
    let index = TfIdfIndex::build(&corpus.questions()).expect("build");

    let scores = index.score("zzz qqq");
    assert_eq!(scores.len(), corpus.len());
    assert!(scores.iter().all(|s| *s == 0.0));
    assert_eq!(index.best_match("zzz qqq"), (0, 0.0));
}

#[test]
fn lexical_scores_repeat_exactly() {
    let corpus = shop_corpus();
    let index = TfIdfIndex::build(&corpus.questions()).expect("build");
    assert_eq!(
        index.score("change my order address"),
        index.score("change my order address")
    );
}

#[test]
fn empty_query_only_for_blank_text() {
    let engine = RetrievalEngine::initialize(shop_corpus(), &config()).expect("init");
    assert_eq!(engine.answer("").unwrap_err(), EngineError::EmptyQuery);
    assert_eq!(engine.answer("   ").unwrap_err(), EngineError::EmptyQuery);
    assert!(engine.answer(" . ").is_ok());
}

#[test]
fn single_entry_corpus_always_returns_it() {
    let corpus = Corpus::from(vec![("Where is my parcel?", "On its way.")]);
    let engine = RetrievalEngine::initialize(corpus, &config()).expect("init");

    for query in ["parcel", "something else entirely", "Where is my parcel?"] {
        let result = engine.answer(query).expect("answer");
        assert_eq!(result.lexical.matched_index, 0);
        assert_eq!(result.semantic.matched_index, 0);
        assert_eq!(result.lexical.answer, "On its way.");
    }
}

#[test]
fn two_entry_scenario() {
    let corpus = Corpus::from(vec![
        ("How do I reset my password?", "Use the reset link on the login page."),
        ("What are your business hours?", "We are open 9am–6pm."),
    ]);
    let engine = RetrievalEngine::initialize(corpus, &EmbeddingConfig::default()).expect("init");

    let exact = engine.answer("How do I reset my password?").expect("answer");
    assert_eq!(exact.lexical.matched_index, 0);
    assert!((exact.lexical.score - 1.0).abs() < 1e-5);

    let hours = engine.answer("hours open").expect("answer");
    assert_eq!(hours.lexical.matched_index, 1);
    assert!(hours.semantic.matched_index <= 1);
    assert!(hours.semantic.score.is_finite());
    assert!((-1.0..=1.0).contains(&hours.semantic.score));
}

#[test]
fn semantic_table_has_fixed_dimensionality() {
    let corpus = Corpus::from(vec![
        ("How do I reset my password?", "a"),
        ("How do I track my order?", "b"),
        ("Opening hours tomorrow?", "c"),
    ]);
    let config = EmbeddingConfig {
        min_term_count: 2,
        ..config()
    };
    let index = Word2VecIndex::build(&corpus.questions(), &config).expect("build");

    assert_eq!(index.dimensionality(), 100);
    for i in 0..corpus.len() {
        assert_eq!(index.question_embedding(i).expect("row").len(), 100);
    }
    let zero_row = index.question_embedding(2).expect("row");
    assert!(zero_row.iter().all(|x| *x == 0.0));
    assert_eq!(index.embed("nothing known here").len(), 100);
}

#[test]
fn initialization_is_all_or_nothing() {
    let err = RetrievalEngine::initialize(Corpus::default(), &config()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Initialization(BuildError::EmptyCorpus)
    ));
    assert!(std::error::Error::source(&err).is_some());
}
