//! End-to-end tests for the inverted-to-direct transposition
//!
//! Fixtures are written through the public index writers, transposed on
//! disk, and read back through the direct posting cursors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use nautex::{
    DirectIndexBuilder, DocId, DocumentIndexBuilder, DocumentIndexEntry, Index,
    InvertedIndexWriter, NautexError, PostingCursor, TranspositionConfig,
};

type TermPostings<'a> = (&'a str, Vec<(u32, u32, Vec<u32>)>);

/// Build an index with the given document lengths and inverted postings
fn build_index(
    dir: &TempDir,
    field_names: Vec<String>,
    doc_lengths: &[(u32, Vec<u32>)],
    terms: &[TermPostings],
) -> Index {
    let mut index = Index::create(dir.path(), "data", field_names).unwrap();

    let mut docs = DocumentIndexBuilder::create(&index, "document").unwrap();
    for (len, field_lens) in doc_lengths {
        docs.add_entry(&DocumentIndexEntry::new(*len, field_lens.clone()))
            .unwrap();
    }
    docs.finish(&mut index).unwrap();

    let mut writer = InvertedIndexWriter::create(&index).unwrap();
    for (term, postings) in terms {
        let converted: Vec<_> = postings
            .iter()
            .map(|(doc, tf, ffs)| (DocId(*doc), *tf, ffs.clone()))
            .collect();
        writer.push_term(term, &converted).unwrap();
    }
    writer.finish(&mut index).unwrap();
    index.flush().unwrap();
    index
}

/// Decode every document's direct posting list as `(term_id, tf)` triples
fn read_direct(index: &Index) -> Vec<Vec<(u32, u32)>> {
    let direct = index.direct_index().unwrap();
    let documents = index.document_index().unwrap();
    let mut all = Vec::new();
    for doc in 0..documents.len() {
        let entry = documents.entry(DocId(doc as u32)).unwrap();
        let mut cursor = direct.open_cursor(entry.pointer);
        let mut postings = Vec::new();
        while let Some(term) = cursor.next().unwrap() {
            postings.push((term.as_u32(), cursor.frequency()));
        }
        all.push(postings);
    }
    all
}

fn three_doc_terms() -> Vec<(&'static str, Vec<(u32, u32, Vec<u32>)>)> {
    vec![
        ("t0", vec![(0, 2, vec![]), (2, 1, vec![])]),
        ("t1", vec![(1, 3, vec![])]),
        ("t2", vec![(0, 1, vec![]), (1, 1, vec![]), (2, 4, vec![])]),
    ]
}

fn three_doc_lengths() -> Vec<(u32, Vec<u32>)> {
    vec![(3, vec![]), (4, vec![]), (5, vec![])]
}

#[test]
fn test_two_pass_transposition() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());

    // Budget 4: docs 0-1 in the first pass, doc 2 in the second
    let builder = DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4));
    builder.create_direct_index(&mut index).unwrap();

    assert_eq!(
        read_direct(&index),
        vec![
            vec![(0, 2), (2, 1)],
            vec![(1, 3), (2, 1)],
            vec![(0, 1), (2, 4)],
        ]
    );

    // Document lengths unchanged by the rewrite
    let documents = index.document_index().unwrap();
    assert_eq!(documents.doc_length(DocId(0)), 3);
    assert_eq!(documents.doc_length(DocId(1)), 4);
    assert_eq!(documents.doc_length(DocId(2)), 5);
}

#[test]
fn test_single_pass_matches_multi_pass() {
    let dir_multi = TempDir::new().unwrap();
    let mut multi = build_index(&dir_multi, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4))
        .create_direct_index(&mut multi)
        .unwrap();

    let dir_single = TempDir::new().unwrap();
    let mut single = build_index(&dir_single, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut single)
        .unwrap();

    assert_eq!(read_direct(&multi), read_direct(&single));
}

#[test]
fn test_transposition_is_faithful() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4))
        .create_direct_index(&mut index)
        .unwrap();

    // Source triples (term_id, doc_id, tf)
    let mut source = Vec::new();
    for (term_id, (_, postings)) in three_doc_terms().iter().enumerate() {
        for (doc, tf, _) in postings {
            source.push((term_id as u32, *doc, *tf));
        }
    }
    source.sort_unstable();

    let mut transposed = Vec::new();
    for (doc, postings) in read_direct(&index).iter().enumerate() {
        for (term, tf) in postings {
            transposed.push((*term, doc as u32, *tf));
        }
    }
    transposed.sort_unstable();

    assert_eq!(source, transposed);
}

#[test]
fn test_direct_term_ids_strictly_ascend() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4))
        .create_direct_index(&mut index)
        .unwrap();

    for postings in read_direct(&index) {
        for pair in postings.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}

#[test]
fn test_round_trip_document_lengths() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4))
        .create_direct_index(&mut index)
        .unwrap();

    let documents = index.document_index().unwrap();
    for (doc, postings) in read_direct(&index).iter().enumerate() {
        let tf_sum: u32 = postings.iter().map(|(_, tf)| tf).sum();
        assert_eq!(tf_sum, documents.doc_length(DocId(doc as u32)));
    }
}

#[test]
fn test_empty_document_shares_previous_pointer() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(
        &dir,
        vec![],
        &[(2, vec![]), (0, vec![]), (3, vec![])],
        &[
            ("a", vec![(0, 2, vec![])]),
            ("b", vec![(2, 3, vec![])]),
        ],
    );
    DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap();

    let documents = index.document_index().unwrap();
    let p0 = documents.entry(DocId(0)).unwrap().pointer;
    let p1 = documents.entry(DocId(1)).unwrap().pointer;
    assert_eq!(p1.byte_offset, p0.byte_offset);
    assert_eq!(p1.bit_offset, p0.bit_offset);
    assert_eq!(p1.num_entries, 0);

    assert_eq!(
        read_direct(&index),
        vec![vec![(0, 2)], vec![], vec![(1, 3)]]
    );
}

#[test]
fn test_offsets_monotonic_in_docid_order() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4))
        .create_direct_index(&mut index)
        .unwrap();

    let documents = index.document_index().unwrap();
    let mut last = (0u64, 0u8);
    for doc in 0..documents.len() {
        let p = documents.entry(DocId(doc as u32)).unwrap().pointer;
        assert!((p.byte_offset, p.bit_offset) >= last);
        last = (p.byte_offset, p.bit_offset);
    }
}

#[test]
fn test_field_frequencies_preserved() {
    let dir = TempDir::new().unwrap();
    let mut doc_lengths: Vec<(u32, Vec<u32>)> = vec![(0, vec![0, 0]); 8];
    doc_lengths[7] = (3, vec![2, 1]);
    let mut index = build_index(
        &dir,
        vec!["title".to_string(), "body".to_string()],
        &doc_lengths,
        &[("t", vec![(7, 3, vec![2, 1])])],
    );
    DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap();

    let direct = index.direct_index().unwrap();
    let documents = index.document_index().unwrap();
    let entry = documents.entry(DocId(7)).unwrap();
    assert_eq!(entry.pointer.num_entries, 1);

    let mut cursor = direct.open_cursor(entry.pointer);
    assert_eq!(cursor.next().unwrap(), Some(DocId(0)));
    assert_eq!(cursor.frequency(), 3);
    assert_eq!(cursor.field_frequencies(), Some(&[2u32, 1][..]));

    assert_eq!(index.property("direct.fields.names"), Some("title,body"));
    assert_eq!(index.property("direct.fields.count"), Some("2"));
}

#[test]
fn test_unaligned_termids_abort_build() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    index.set_property("index.lexicon.termids", "unordered");
    index.flush().unwrap();

    let err = DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap_err();
    assert!(matches!(err, NautexError::UnalignedTermIds));
    assert!(err.is_precondition());
    assert!(!index.has_structure("direct"));

    // Nothing was registered on disk either
    let reopened = Index::open(dir.path(), "data").unwrap();
    assert!(!reopened.has_structure("direct"));
}

#[test]
fn test_missing_source_aborts_build() {
    let dir = TempDir::new().unwrap();
    let mut index = Index::create(dir.path(), "data", vec![]).unwrap();
    let err = DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap_err();
    assert!(matches!(err, NautexError::MissingStructure(_)));
}

#[test]
fn test_existing_destination_aborts_build() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap();

    let err = DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap_err();
    assert!(matches!(err, NautexError::StructureExists(_)));
}

#[test]
fn test_old_index_version_aborts_build() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    index.set_property("index.version", "1.9");

    let err = DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap_err();
    assert!(matches!(err, NautexError::UnsupportedVersion(_)));
}

#[test]
fn test_cancellation_at_pass_boundary() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());

    let cancel = Arc::new(AtomicBool::new(true));
    let err = DirectIndexBuilder::new(TranspositionConfig::default())
        .with_cancel_flag(Arc::clone(&cancel))
        .create_direct_index(&mut index)
        .unwrap_err();
    assert!(matches!(err, NautexError::Cancelled));
    assert!(!index.has_structure("direct"));

    // Clearing the flag lets the build complete
    cancel.store(false, Ordering::Relaxed);
    DirectIndexBuilder::new(TranspositionConfig::default())
        .with_cancel_flag(cancel)
        .create_direct_index(&mut index)
        .unwrap();
    assert!(index.has_structure("direct"));
}

#[test]
fn test_token_mismatch_is_advisory() {
    let dir = TempDir::new().unwrap();
    // Document lengths deliberately disagree with the posting tf sums
    let mut index = build_index(
        &dir,
        vec![],
        &[(10, vec![]), (10, vec![])],
        &[("a", vec![(0, 1, vec![]), (1, 2, vec![])])],
    );
    DirectIndexBuilder::new(TranspositionConfig::default())
        .create_direct_index(&mut index)
        .unwrap();

    // The build completes; the mismatch is only logged
    assert!(index.has_structure("direct"));
    assert_eq!(read_direct(&index), vec![vec![(0, 1)], vec![(0, 2)]]);
}

#[test]
fn test_scratch_file_removed_and_checksum_recorded() {
    let dir = TempDir::new().unwrap();
    let mut index = build_index(&dir, vec![], &three_doc_lengths(), &three_doc_terms());
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(4))
        .create_direct_index(&mut index)
        .unwrap();

    assert!(!index.structure_path("direct", ".offsets").exists());
    assert!(index.structure_path("direct", ".bf").exists());
    let checksum: u32 = index.property("direct.checksum").unwrap().parse().unwrap();
    assert_ne!(checksum, 0);
}

#[test]
fn test_larger_collection_multi_pass() {
    // 20 documents, a handful of terms, pass budget forcing several windows
    let dir = TempDir::new().unwrap();

    let num_docs = 20u32;
    let terms: Vec<(&str, Vec<(u32, u32, Vec<u32>)>)> = vec![
        ("alpha", (0..num_docs).step_by(2).map(|d| (d, 1 + d % 3, vec![])).collect()),
        ("beta", (0..num_docs).step_by(3).map(|d| (d, 2, vec![])).collect()),
        ("delta", vec![(19, 5, vec![])]),
        ("omega", (0..num_docs).map(|d| (d, 1, vec![])).collect()),
    ];

    // Per-document lengths = tf sums, so the windows line up with reality
    let mut lengths = vec![0u32; num_docs as usize];
    for (_, postings) in &terms {
        for (doc, tf, _) in postings {
            lengths[*doc as usize] += tf;
        }
    }
    let doc_lengths: Vec<(u32, Vec<u32>)> =
        lengths.iter().map(|&l| (l, vec![])).collect();

    let mut index = build_index(&dir, vec![], &doc_lengths, &terms);
    DirectIndexBuilder::new(TranspositionConfig::default().with_process_tokens(7))
        .create_direct_index(&mut index)
        .unwrap();

    let mut source = Vec::new();
    for (term_id, (_, postings)) in terms.iter().enumerate() {
        for (doc, tf, _) in postings {
            source.push((term_id as u32, *doc, *tf));
        }
    }
    source.sort_unstable();

    let mut transposed = Vec::new();
    for (doc, postings) in read_direct(&index).iter().enumerate() {
        for (term, tf) in postings {
            transposed.push((*term, doc as u32, *tf));
        }
    }
    transposed.sort_unstable();
    assert_eq!(source, transposed);
}
