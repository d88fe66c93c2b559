mod common;

use std::collections::BTreeMap;

use common::{FIXTURE_TITLE, build_zip, create_test_store, fixture_files, fixture_zip};
use yomi_dictionary::{DefinitionKind, ImportError, Store, StoreCounts, Term, YomitanImporter};

fn import_fixture(store: &Store) -> i64 {
    YomitanImporter::new(store)
        .import_bytes(&fixture_zip("", false), |_| {})
        .unwrap()
        .id
}

fn readings(terms: &[Term]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for term in terms {
        *counts.entry(term.reading.as_str()).or_insert(0) += 1;
    }
    counts
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const FIXTURE_COUNTS: StoreCounts = StoreCounts {
    dictionaries: 1,
    terms: 20,
    kanji: 2,
    term_meta: 10,
    kanji_meta: 4,
    tag_meta: 5,
};

#[test]
fn test_import_fixture_counts() {
    let (store, _temp) = create_test_store();
    let dict = YomitanImporter::new(&store)
        .import_bytes(&fixture_zip("", false), |_| {})
        .unwrap();

    assert_eq!(dict.title, FIXTURE_TITLE);
    assert_eq!(dict.revision, "test");
    assert_eq!(dict.format, 3);
    assert!(dict.sequenced);
    assert_eq!(dict.author.as_deref(), Some("yomi"));
    assert_eq!(dict.description.as_deref(), Some("Fixture dictionary"));
    assert_eq!(dict.url, None);
    assert_eq!(store.counts().unwrap(), FIXTURE_COUNTS);
}

#[test]
fn test_nesting_and_index_position_do_not_matter() {
    for (prefix, index_last) in [("", true), ("nested/", false), ("a/b/c/", true)] {
        let (store, _temp) = create_test_store();
        YomitanImporter::new(&store)
            .import_bytes(&fixture_zip(prefix, index_last), |_| {})
            .unwrap();
        assert_eq!(store.counts().unwrap(), FIXTURE_COUNTS, "prefix {prefix:?}");
    }
}

#[test]
fn test_term_count_independent_of_bank_split() {
    // One term per bank file
    let mut files = Vec::new();
    let mut n = 0;
    for (name, body) in fixture_files() {
        if !name.starts_with("term_bank_") {
            files.push((name, body));
            continue;
        }
        let rows: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        for row in rows {
            n += 1;
            files.push((format!("split/term_bank_{n}.json"), serde_json::to_vec(&vec![row]).unwrap()));
        }
    }

    let (store, _temp) = create_test_store();
    let mut reported = 0;
    YomitanImporter::new(&store)
        .import_bytes(&build_zip(&files), |p| reported = p.total)
        .unwrap();

    assert_eq!(n, 20);
    assert_eq!(reported, 20 + 4);
    assert_eq!(store.counts().unwrap().terms, 20);
}

#[test]
fn test_missing_index_leaves_store_empty() {
    let (store, _temp) = create_test_store();
    let files: Vec<_> = fixture_files()
        .into_iter()
        .filter(|(name, _)| name != "index.json")
        .collect();

    let err = YomitanImporter::new(&store)
        .import_bytes(&build_zip(&files), |_| panic!("no bank may be processed"))
        .unwrap_err();

    assert!(matches!(err, ImportError::MissingIndex));
    assert_eq!(store.counts().unwrap(), StoreCounts::default());
}

#[test]
fn test_progress_is_monotonic_per_bank() {
    let (store, _temp) = create_test_store();
    let mut seen = Vec::new();
    YomitanImporter::new(&store)
        .import_bytes(&fixture_zip("x/", true), |p| seen.push(p.clone()))
        .unwrap();

    let names: Vec<&str> = seen.iter().map(|p| p.file_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "kanji_bank_1.json",
            "kanji_meta_bank_1.json",
            "tag_bank_1.json",
            "term_bank_1.json",
            "term_bank_2.json",
            "term_meta_bank_1.json",
        ]
    );
    for (i, progress) in seen.iter().enumerate() {
        assert_eq!(progress.processed, i + 1);
        assert_eq!(progress.total, 6);
    }
}

#[test]
fn test_exact_search_readings() {
    let (store, _temp) = create_test_store();
    import_fixture(&store);

    let terms = store
        .find_terms_exact(&strings(&["打", "打つ", "打ち込む"]), None)
        .unwrap();
    assert_eq!(terms.len(), 10);

    let expected: BTreeMap<&str, usize> =
        [("だ", 1), ("ダース", 1), ("うつ", 2), ("ぶつ", 2), ("うちこむ", 2), ("ぶちこむ", 2)]
            .into_iter()
            .collect();
    assert_eq!(readings(&terms), expected);

    assert!(store.find_terms_exact(&strings(&["込む"]), None).unwrap().is_empty());
}

#[test]
fn test_exact_search_by_expression_and_reading() {
    let (store, _temp) = create_test_store();
    import_fixture(&store);

    let total: usize = [("打", "だ"), ("打つ", "うつ"), ("打ち込む", "うちこむ")]
        .iter()
        .map(|(e, r)| store.find_term_exact(e, r).unwrap().len())
        .sum();
    assert_eq!(total, 5);
    assert!(store.find_term_exact("打つ", "うちこむ").unwrap().is_empty());
}

#[test]
fn test_prefix_and_suffix_search() {
    let (store, _temp) = create_test_store();
    import_fixture(&store);

    let prefix = store.find_terms_by_prefix("打").unwrap();
    assert_eq!(prefix.len(), 10);
    assert!(prefix.iter().all(|t| t.expression.starts_with('打')));

    let suffix = store.find_terms_by_suffix("込む").unwrap();
    assert_eq!(suffix.len(), 4);
    assert!(suffix.iter().all(|t| t.expression == "打ち込む"));

    // Readings are searched too
    assert_eq!(store.find_terms_by_prefix("うち").unwrap().len(), 2);
}

#[test]
fn test_sequence_search_groups_by_expression() {
    let (store, _temp) = create_test_store();
    import_fixture(&store);

    let terms = store.find_terms_by_sequence(&[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(terms.len(), 11);

    let mut by_expression: BTreeMap<&str, usize> = BTreeMap::new();
    for term in &terms {
        *by_expression.entry(term.expression.as_str()).or_insert(0) += 1;
    }
    let expected: BTreeMap<&str, usize> = [("打", 2), ("打つ", 4), ("打ち込む", 4), ("画像", 1)]
        .into_iter()
        .collect();
    assert_eq!(by_expression, expected);
}

#[test]
fn test_loose_fields_are_coerced() {
    let (store, _temp) = create_test_store();
    import_fixture(&store);

    let run = store.find_term_exact("走る", "はしる").unwrap();
    assert_eq!(run[0].score, 8);

    let hurl = store.find_term_exact("打ち込む", "ぶちこむ").unwrap();
    assert_eq!(hurl.iter().map(|t| t.score).collect::<Vec<_>>(), [5, 0]);

    let read = store.find_term_exact("読む", "よむ").unwrap();
    assert_eq!(read[0].term_tags, "P");
    assert_eq!(read[0].rules, "v5m");
}

#[test]
fn test_definitions_keep_order_and_kind() {
    let (store, _temp) = create_test_store();
    import_fixture(&store);

    let da = store.find_term_exact("打", "だ").unwrap();
    let contents: Vec<&str> = da[0].definitions.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, ["da definition 1", "da definition 2"]);

    let butsu = store.find_term_exact("打つ", "ぶつ").unwrap();
    let speech = &butsu[1].definitions[0];
    assert_eq!(speech.kind, DefinitionKind::Structured);
    assert_eq!(
        speech.content,
        r#"{"type":"structured-content","content":"to deliver a speech"}"#
    );
}

#[test]
fn test_kanji_meta_and_tags() {
    let (store, _temp) = create_test_store();
    let id = import_fixture(&store);

    let kanji = store.find_kanji(&strings(&["打"])).unwrap();
    assert_eq!(kanji.len(), 1);
    assert_eq!(kanji[0].onyomi, "ダ ダース");
    assert_eq!(kanji[0].meanings, "utsu meaning 1\nutsu meaning 2");

    let meta = store.find_term_meta(&strings(&["打ち込む"]), Some(&[id][..])).unwrap();
    assert_eq!(meta.len(), 6);
    assert_eq!(meta.iter().filter(|m| m.mode == "pitch").count(), 2);
    assert_eq!(meta[1].data, "four");
    assert_eq!(meta[2].data, r#"{"value":5,"displayValue":"5㋕"}"#);

    assert_eq!(store.find_kanji_meta(&strings(&["打"])).unwrap().len(), 3);

    let popular = store.find_tag("P", FIXTURE_TITLE).unwrap().unwrap();
    assert_eq!(popular.category, "popular");
    assert_eq!(popular.order, -10);
    assert_eq!(popular.score, 10);
    assert!(store.find_tag("P", "Other Dictionary").unwrap().is_none());
}

#[test]
fn test_summary_and_delete() {
    let (store, _temp) = create_test_store();
    let id = import_fixture(&store);

    let summaries = store.dictionary_summaries().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].term_count, 20);
    assert_eq!(summaries[0].kanji_count, 2);

    assert!(store.delete_dictionary(id).unwrap());
    assert_eq!(store.counts().unwrap(), StoreCounts::default());
    assert!(store.terms_in_dictionaries(&[id]).unwrap().is_empty());
    assert!(store.find_terms_exact(&strings(&["打"]), Some(&[id][..])).unwrap().is_empty());
}

#[test]
fn test_reimport_duplicates_rows() {
    let (store, _temp) = create_test_store();
    let first = import_fixture(&store);
    let second = import_fixture(&store);

    assert_ne!(first, second);
    let counts = store.counts().unwrap();
    assert_eq!(counts.dictionaries, 2);
    assert_eq!(counts.terms, 40);
}
