use searchcore::{InvertedIndex, StopWords, Tokenizer};

#[test]
fn it_lowercases_and_filters_stopwords() {
    let tok = Tokenizer::new(["the", "and"].into_iter().collect::<StopWords>());
    let words = tok.tokenize("The quick brown fox AND the lazy dog");
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn stopwords_never_become_index_keys() {
    let tok = Tokenizer::new(["the"].into_iter().collect::<StopWords>());
    let index = InvertedIndex::build(&tok, ["cat||  The dog walks", "b|| THE end"]);
    assert!(!index.contains_term("the"));
    assert!(index.lookup("the").is_empty());
    assert!(index.contains_term("end"));
}

#[test]
fn dog_maps_to_the_cat_document() {
    let index = InvertedIndex::build(&Tokenizer::default(), ["cat||  dog walks"]);
    let ids: Vec<_> = index.lookup("dog").iter().map(|p| p.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["cat||"]);
    assert!(index.lookup("cat").is_empty());
}

#[test]
fn english_list_covers_common_words() {
    let sw = StopWords::english();
    assert!(sw.contains("the") && sw.contains("wouldn't"));
    assert!(!sw.contains("dog"));
}
