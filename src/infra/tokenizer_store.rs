// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages subword tokenizer building, saving, and loading.
//
// The tokenizer is a black-box collaborator: the pipeline only
// consumes encode(text) → ids. What matters here is that train
// and predict share ONE vocabulary, so the store persists a
// tokenizer.json next to the checkpoints and predict always
// loads it rather than rebuilding.
//
// When no tokenizer exists yet, a lowercase word-level
// vocabulary is built from corpus frequencies and written in
// the HuggingFace tokenizer JSON format — which is exactly
// what Tokenizer::from_file() expects, bypassing the trainer
// type mismatch in tokenizers 0.15 entirely.
//
// Vocabulary layout: [PAD]=0 (must stay 0 — the example builder
// pads with id 0), [UNK]=1, then corpus words by descending
// frequency.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load existing tokenizer or build a new one from texts.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from its JSON file.
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })
    }

    /// Build a lowercase word-level vocabulary from corpus word
    /// frequencies and write a valid tokenizer JSON.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Count word frequencies across the corpus ──────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                // Strip punctuation from edges
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Sort by frequency descending, take top vocab_size - 2
        // (reserve slots for [PAD] and [UNK])
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(2));

        // ── Step 2: Build the vocab JSON ──────────────────────────────────────
        let mut vocab = serde_json::json!({
            "[PAD]": 0,
            "[UNK]": 1,
        });

        let mut next_id = 2usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        // Load back as a proper Tokenizer instance
        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> (TokenizerStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "qtl_screener_tok_{}_{}",
            std::process::id(),
            tag,
        ));
        (TokenizerStore::new(dir.display().to_string()), dir)
    }

    #[test]
    fn test_builds_and_reloads_vocabulary() {
        let (store, dir) = temp_store("build");
        let corpus = vec![
            "QTL mapping in dairy cattle".to_string(),
            "QTL regions for milk yield".to_string(),
        ];
        let tok = store.load_or_build(&corpus, 100).unwrap();

        // Known corpus word encodes to a non-UNK id
        let enc = tok.encode("qtl", false).unwrap();
        assert_eq!(enc.get_ids().len(), 1);
        assert!(enc.get_ids()[0] > 1);

        // Second call loads the same vocabulary from disk
        let tok2 = store.load_or_build(&[], 100).unwrap();
        let enc2 = tok2.encode("qtl", false).unwrap();
        assert_eq!(enc.get_ids(), enc2.get_ids());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unknown_word_maps_to_unk() {
        let (store, dir) = temp_store("unk");
        let corpus = vec!["cattle milk yield".to_string()];
        let tok = store.load_or_build(&corpus, 100).unwrap();

        let enc = tok.encode("zebrafish", false).unwrap();
        assert_eq!(enc.get_ids(), &[1]); // [UNK]
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_uppercase_normalized_to_vocab_hit() {
        let (store, dir) = temp_store("case");
        let corpus = vec!["cattle".to_string()];
        let tok = store.load_or_build(&corpus, 100).unwrap();

        let upper = tok.encode("CATTLE", false).unwrap();
        let lower = tok.encode("cattle", false).unwrap();
        assert_eq!(upper.get_ids(), lower.get_ids());
        assert_ne!(upper.get_ids(), &[1]);
        std::fs::remove_dir_all(dir).ok();
    }
}
