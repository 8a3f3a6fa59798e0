mod common;

use common::{
    BrokenQueryEmbedder, FailingScorer, OverlapScorer, TableEmbedder, TableScorer, fixture,
    ml_corpus, retrieval,
};
use pretty_assertions::assert_eq;
use rag_retrieval::{
    CorpusStore, Dependency, ErrorKind, FusedScore, HitScore, HybridRetrieval, LexicalRetriever,
    NO_RELEVANT_DOCUMENTS, RankingMode, RetrievalConfig, RetrievalError, SearchSource,
};
use rag_utils_tokenizer::WordTokenizer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn uncached() -> RetrievalConfig {
    RetrievalConfig {
        enable_cache: false,
        ..Default::default()
    }
}

fn contents(results: &rag_retrieval::SearchResults) -> Vec<&str> {
    results
        .results
        .iter()
        .map(|r| r.document.content.as_str())
        .collect()
}

#[test_log::test(tokio::test)]
async fn returns_at_most_five_sorted_by_score() {
    let corpus = ml_corpus();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &texts).await;
    let retrieval = retrieval(uncached(), embedder, &fixture, Some(Arc::new(OverlapScorer)));

    let results = retrieval.search("deep learning basics").await.unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(results.ranking, RankingMode::Reranked);
    assert!(results.results.iter().all(|r| r.score.is_unified()));
    assert!(
        results
            .results
            .windows(2)
            .all(|pair| pair[0].score.value() >= pair[1].score.value())
    );
    assert_eq!(results.results[0].document.content, corpus[20]);
    assert_eq!(results.total_candidates, 10 + 3);
    assert!(results.stats.reranked);
    assert_eq!(results.stats.semantic_count, 10);
    assert_eq!(results.stats.lexical_count, 3);
}

#[tokio::test]
async fn same_query_twice_gives_same_results() {
    let corpus = ml_corpus();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &texts).await;

    let plain = retrieval(uncached(), embedder.clone(), &fixture, Some(Arc::new(OverlapScorer)));
    let first = plain.search("transfer learning").await.unwrap();
    let second = plain.search("transfer learning").await.unwrap();
    assert_eq!(first.results, second.results);

    let cached = retrieval(
        RetrievalConfig::default(),
        embedder,
        &fixture,
        Some(Arc::new(OverlapScorer)),
    );
    let first_cached = cached.search("transfer learning").await.unwrap();
    let second_cached = cached.search("  transfer learning ").await.unwrap();
    assert!(!first_cached.stats.cache_hit);
    assert!(second_cached.stats.cache_hit);
    assert_eq!(first_cached.results, second_cached.results);
    assert_eq!(first.results, first_cached.results);
}

#[tokio::test]
async fn sequential_and_parallel_retrieval_agree() {
    let corpus = ml_corpus();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &texts).await;

    let parallel = retrieval(uncached(), embedder.clone(), &fixture, Some(Arc::new(OverlapScorer)));
    let sequential = retrieval(
        RetrievalConfig {
            parallel_retrieval: false,
            ..uncached()
        },
        embedder,
        &fixture,
        Some(Arc::new(OverlapScorer)),
    );

    let a = parallel.search("random forests and decision trees").await.unwrap();
    let b = sequential.search("random forests and decision trees").await.unwrap();
    assert_eq!(a.results, b.results);
}

#[tokio::test]
async fn degraded_mode_keeps_semantic_then_lexical_order() {
    let query = "deep learning basics";
    let near = "Neural network fundamentals";
    let middle = "Statistics refresher";
    let far = "Deep sea fishing for beginners";
    let embedder = Arc::new(TableEmbedder::new(&[
        (query, [1.0, 0.0, 0.0, 0.0]),
        (near, [0.9, 0.1, 0.0, 0.0]),
        (middle, [0.5, 0.5, 0.0, 0.0]),
        (far, [0.0, 0.0, 1.0, 0.0]),
    ]));
    let fixture = fixture(embedder.as_ref(), &[far, near, middle]).await;
    let retrieval = retrieval(uncached(), embedder, &fixture, None);

    let results = retrieval.search(query).await.unwrap();

    assert_eq!(results.ranking, RankingMode::RerankerUnavailable);
    assert_eq!(contents(&results), vec![near, middle, far, far]);
    let sources: Vec<SearchSource> = results.results.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![
            SearchSource::Semantic,
            SearchSource::Semantic,
            SearchSource::Semantic,
            SearchSource::Lexical,
        ]
    );

    assert!(matches!(
        results.results[0].score,
        FusedScore::Provisional(HitScore::Scored(s)) if s > 0.9
    ));
    assert_eq!(results.results[2].score.value(), 0.0);
    assert_eq!(
        results.results[3].score,
        FusedScore::Provisional(HitScore::Unscored)
    );
    assert_eq!(results.results[3].score.value(), 0.0);
    assert!(!results.stats.reranked);
}

#[tokio::test]
async fn empty_corpus_returns_advisory() {
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &[]).await;
    let retrieval = retrieval(uncached(), embedder, &fixture, Some(Arc::new(OverlapScorer)));

    let results = retrieval.search("anything at all").await.unwrap();

    assert!(results.is_empty());
    assert_eq!(results.advisory(), Some(NO_RELEVANT_DOCUMENTS));
    assert_eq!(results.total_candidates, 0);
    assert_eq!(retrieval.corpus_size(), 0);
}

#[tokio::test]
async fn whitespace_record_is_in_both_retrievers_corpus() {
    let query = "padding query";
    let spaces = "   ";
    let passage = "real passage";
    let embedder = Arc::new(TableEmbedder::new(&[
        (query, [1.0, 0.0, 0.0, 0.0]),
        (spaces, [1.0, 0.0, 0.0, 0.0]),
        (passage, [0.0, 1.0, 0.0, 0.0]),
    ]));
    let fixture = fixture(embedder.as_ref(), &[spaces, passage]).await;
    assert_eq!(fixture.corpus.len(), fixture.store.count());

    let retrieval = retrieval(uncached(), embedder, &fixture, None);
    assert_eq!(retrieval.corpus_size(), 2);

    let results = retrieval.search(query).await.unwrap();
    assert_eq!(contents(&results), vec![spaces, passage]);
    assert!(matches!(
        results.results[0].score,
        FusedScore::Provisional(HitScore::Scored(s)) if s > 0.99
    ));
}

#[tokio::test]
async fn reranker_sees_full_pool_before_truncation() {
    let corpus = ml_corpus();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &texts).await;

    // Ten semantic hits (docs 0..10) then lexical hits 14, 15, 20: doc 15 is twelfth.
    let twelfth = corpus[15].as_str();
    let scorer = Arc::new(TableScorer::new(&[(twelfth, 5.0)]));

    let degraded = retrieval(uncached(), embedder.clone(), &fixture, None);
    let before = degraded.search("learning").await.unwrap();
    assert_eq!(before.total_candidates, 13);
    assert!(!contents(&before).contains(&twelfth));

    let reranked = retrieval(uncached(), embedder, &fixture, Some(scorer));
    let results = reranked.search("learning").await.unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results.results[0].document.content, twelfth);
    assert_eq!(results.results[0].score, FusedScore::Unified(5.0));
    assert_eq!(results.results[0].rank, 0);
}

#[tokio::test]
async fn unavailable_is_distinct_from_internal_failure() {
    let lexical = LexicalRetriever::build(
        Arc::new(CorpusStore::from_documents(vec![rag_retrieval::Document::untitled(
            "deep learning",
        )])),
        Arc::new(WordTokenizer::default()),
        1.5,
        0.75,
    );
    let no_index = HybridRetrieval::new(uncached(), None, Some(lexical), None).unwrap();
    let err = no_index.search("deep learning").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(matches!(err, RetrievalError::Unavailable(ref deps) if deps == &[Dependency::Semantic]));

    let nothing_loaded = HybridRetrieval::new(uncached(), None, None, None).unwrap();
    let err = nothing_loaded.search("deep learning").await.unwrap_err();
    assert!(
        matches!(err, RetrievalError::Unavailable(ref deps) if deps == &[Dependency::Semantic, Dependency::Lexical])
    );

    let embedder = Arc::new(BrokenQueryEmbedder {
        armed: AtomicBool::new(false),
    });
    let fixture = fixture(embedder.as_ref(), &["deep learning"]).await;
    embedder.armed.store(true, Ordering::SeqCst);
    let broken = retrieval(uncached(), embedder, &fixture, Some(Arc::new(OverlapScorer)));
    let err = broken.search("deep learning").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(matches!(err, RetrievalError::Embedding(_)));
}

#[tokio::test]
async fn blank_query_never_reaches_retrievers() {
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &["some passage"]).await;
    let retrieval = retrieval(uncached(), embedder.clone(), &fixture, Some(Arc::new(OverlapScorer)));
    let calls_before = embedder.calls();

    for blank in ["", "   ", "\t\n "] {
        let err = retrieval.search(blank).await.unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyQuery));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
    assert_eq!(embedder.calls(), calls_before);
}

#[tokio::test]
async fn reranker_alone_decides_between_lexical_and_semantic_matches() {
    let query = "deep learning basics";
    let lexical_match = "Deep sea fishing basics for learning anglers";
    let semantic_match = "An introduction to neural network fundamentals";
    let filler = "Recipes for sourdough bread";
    let embedder = Arc::new(TableEmbedder::new(&[
        (query, [1.0, 0.0, 0.0, 0.0]),
        (semantic_match, [0.95, 0.05, 0.0, 0.0]),
        (lexical_match, [0.0, 0.0, 1.0, 0.0]),
        (filler, [0.0, 1.0, 0.0, 0.0]),
    ]));
    let fixture = fixture(embedder.as_ref(), &[filler, lexical_match, semantic_match]).await;
    let config = RetrievalConfig {
        semantic_k: 1,
        lexical_k: 1,
        final_result_count: 2,
        ..uncached()
    };

    let prefers_lexical = retrieval(
        config.clone(),
        embedder.clone(),
        &fixture,
        Some(Arc::new(TableScorer::new(&[(lexical_match, 0.8), (semantic_match, 0.3)]))),
    );
    let results = prefers_lexical.search(query).await.unwrap();
    assert_eq!(results.total_candidates, 2);
    assert_eq!(contents(&results), vec![lexical_match, semantic_match]);

    let prefers_semantic = retrieval(
        config,
        embedder,
        &fixture,
        Some(Arc::new(TableScorer::new(&[(lexical_match, 0.1), (semantic_match, 0.9)]))),
    );
    let results = prefers_semantic.search(query).await.unwrap();
    assert_eq!(contents(&results), vec![semantic_match, lexical_match]);
}

#[test_log::test(tokio::test)]
async fn failed_rerank_degrades_and_is_not_cached() {
    let corpus = ml_corpus();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &texts).await;
    let retrieval = retrieval(
        RetrievalConfig::default(),
        embedder,
        &fixture,
        Some(Arc::new(FailingScorer)),
    );

    let results = retrieval.search("dropout").await.unwrap();
    assert_eq!(results.ranking, RankingMode::RerankFailed);
    assert_eq!(results.len(), 5);
    assert_eq!(results.results[0].source, SearchSource::Semantic);
    assert_eq!(retrieval.cache_stats().await.size, 0);

    let again = retrieval.search("dropout").await.unwrap();
    assert!(!again.stats.cache_hit);
}

#[tokio::test]
async fn cache_can_be_cleared() {
    let corpus = ml_corpus();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let embedder = Arc::new(TableEmbedder::new(&[]));
    let fixture = fixture(embedder.as_ref(), &texts).await;
    let retrieval = retrieval(
        RetrievalConfig {
            cache_size: 10,
            ..Default::default()
        },
        embedder,
        &fixture,
        Some(Arc::new(OverlapScorer)),
    );

    retrieval.search("attention").await.unwrap();
    let stats = retrieval.cache_stats().await;
    assert_eq!((stats.size, stats.capacity), (1, 10));

    retrieval.clear_cache().await;
    assert_eq!(retrieval.cache_stats().await.size, 0);
    assert!(!retrieval.search("attention").await.unwrap().stats.cache_hit);
}
