use lyric_core::tokenizer::tokenize;

#[test]
fn it_lowercases_and_splits_hyphens() {
    let words = tokenize("Hold-Me CLOSER, tiny\tdancer");
    assert_eq!(words, vec!["hold", "me", "closer,", "tiny", "dancer"]);
}

#[test]
fn it_keeps_stopwords_and_unstemmed_forms() {
    let words = tokenize("The running runners and the run");
    assert!(words.contains(&"the".to_string()));
    assert!(words.contains(&"and".to_string()));
    assert!(words.contains(&"running".to_string()));
    assert!(words.contains(&"runners".to_string()));
    assert_eq!(words.len(), 6);
}

#[test]
fn it_never_emits_empty_terms() {
    let words = tokenize(" -a--b-  \n c- ");
    assert_eq!(words, vec!["a", "b", "c"]);
    assert!(words.iter().all(|w| !w.is_empty()));
}
