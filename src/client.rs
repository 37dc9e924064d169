use crate::error::{mask_credential, GenerationError};
use crate::keys::KeyPool;
use crate::llm::ModelBackend;
use crate::types::AspectRatio;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Wraps one logical call to the generative service in the key-rotation
/// failover loop. Three response shapes: plain text, schema-validated JSON,
/// and image bytes.
///
/// The loop tries each credential at most once per logical call: it
/// remembers the cursor at entry and stops as soon as the rotation wraps
/// back to it. Individual key failures are routine and only logged; the
/// caller sees an error once the whole rotation is exhausted.
#[derive(Debug)]
pub struct GenerationClient<B> {
    backend: B,
    pool: Arc<KeyPool>,
}

impl<B: ModelBackend> GenerationClient<B> {
    pub fn new(backend: B, pool: Arc<KeyPool>) -> Self {
        Self { backend, pool }
    }

    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let rotation = self.pool.len();
        if rotation == 0 {
            return Err(GenerationError::EmptyCredentialSet);
        }
        let start = self.pool.cursor();
        let mut attempts = 0;
        let mut last: Option<GenerationError> = None;

        for _ in 0..rotation {
            let dispensed = self.pool.next_key()?;
            attempts += 1;
            match self.backend.generate_text(&dispensed.key, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    self.pool.mark_failed(dispensed.index);
                    log::warn!(
                        "text call failed with key {}: {:#}",
                        mask_credential(&dispensed.key),
                        e
                    );
                    last = Some(GenerationError::Backend(format!("{:#}", e)));
                    if self.pool.cursor() == start {
                        break;
                    }
                }
            }
        }

        Err(GenerationError::CredentialExhausted {
            attempts,
            last: last.map(Box::new),
        })
    }

    /// Structured variant: the raw model text must itself parse into `T`.
    /// A parse or shape mismatch counts as that credential's failure and the
    /// rotation continues; it is only fatal on the last credential.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<T, GenerationError> {
        let rotation = self.pool.len();
        if rotation == 0 {
            return Err(GenerationError::EmptyCredentialSet);
        }
        let start = self.pool.cursor();
        let mut attempts = 0;
        let mut last: Option<GenerationError> = None;

        for _ in 0..rotation {
            let dispensed = self.pool.next_key()?;
            attempts += 1;
            let failure = match self
                .backend
                .generate_json(&dispensed.key, prompt, schema)
                .await
            {
                Ok(raw) => {
                    let cleaned = strip_code_blocks(&raw);
                    match serde_json::from_str::<T>(&cleaned) {
                        Ok(value) => return Ok(value),
                        Err(e) => GenerationError::MalformedResponse(e.to_string()),
                    }
                }
                Err(e) => GenerationError::Backend(format!("{:#}", e)),
            };

            self.pool.mark_failed(dispensed.index);
            log::warn!(
                "structured call failed with key {}: {}",
                mask_credential(&dispensed.key),
                failure
            );
            last = Some(failure);
            if self.pool.cursor() == start {
                break;
            }
        }

        Err(GenerationError::CredentialExhausted {
            attempts,
            last: last.map(Box::new),
        })
    }

    /// Image variant: an empty byte payload is a failure, not a zero-length
    /// success.
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<u8>, GenerationError> {
        let rotation = self.pool.len();
        if rotation == 0 {
            return Err(GenerationError::EmptyCredentialSet);
        }
        let start = self.pool.cursor();
        let mut attempts = 0;
        let mut last: Option<GenerationError> = None;

        for _ in 0..rotation {
            let dispensed = self.pool.next_key()?;
            attempts += 1;
            let failure = match self
                .backend
                .generate_image(&dispensed.key, prompt, aspect_ratio)
                .await
            {
                Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
                Ok(_) => GenerationError::Backend("empty image result".to_string()),
                Err(e) => GenerationError::Backend(format!("{:#}", e)),
            };

            self.pool.mark_failed(dispensed.index);
            log::warn!(
                "image call failed with key {}: {}",
                mask_credential(&dispensed.key),
                failure
            );
            last = Some(failure);
            if self.pool.cursor() == start {
                break;
            }
        }

        Err(GenerationError::CredentialExhausted {
            attempts,
            last: last.map(Box::new),
        })
    }
}

/// Models occasionally wrap JSON in markdown fences even when asked not to.
pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend scripted per key: keys listed in `failing` error out, others
    /// return the canned payloads. Every key used is recorded.
    #[derive(Debug, Default)]
    struct ScriptedBackend {
        failing: Vec<String>,
        text: String,
        json: String,
        image: Vec<u8>,
        used_keys: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn record(&self, key: &str) -> bool {
            self.used_keys.lock().unwrap().push(key.to_string());
            self.failing.iter().any(|k| k == key)
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn generate_text(&self, api_key: &str, _prompt: &str) -> Result<String> {
            if self.record(api_key) {
                Err(anyhow!("quota exceeded"))
            } else {
                Ok(self.text.clone())
            }
        }

        async fn generate_json(
            &self,
            api_key: &str,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<String> {
            if self.record(api_key) {
                Err(anyhow!("quota exceeded"))
            } else {
                Ok(self.json.clone())
            }
        }

        async fn generate_image(
            &self,
            api_key: &str,
            _prompt: &str,
            _aspect_ratio: AspectRatio,
        ) -> Result<Vec<u8>> {
            if self.record(api_key) {
                Err(anyhow!("quota exceeded"))
            } else {
                Ok(self.image.clone())
            }
        }
    }

    fn pool(n: usize) -> Arc<KeyPool> {
        Arc::new(KeyPool::new((1..=n).map(|i| format!("key-{}", i)).collect()))
    }

    #[tokio::test]
    async fn failover_returns_first_success() {
        let backend = ScriptedBackend {
            failing: vec!["key-1".into(), "key-2".into()],
            text: "a script".into(),
            ..Default::default()
        };
        let client = GenerationClient::new(backend, pool(3));

        let result = client.generate_text("prompt").await.unwrap();
        assert_eq!(result, "a script");
        // Cursor sits just past the key that succeeded.
        assert_eq!(client.pool().cursor(), 0);
        assert_eq!(
            *client.backend.used_keys.lock().unwrap(),
            vec!["key-1", "key-2", "key-3"]
        );
    }

    #[tokio::test]
    async fn exhaustion_after_exactly_n_attempts() {
        let backend = ScriptedBackend {
            failing: vec!["key-1".into(), "key-2".into(), "key-3".into()],
            ..Default::default()
        };
        let client = GenerationClient::new(backend, pool(3));

        let err = client.generate_text("prompt").await.unwrap_err();
        match err {
            GenerationError::CredentialExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(client.backend.used_keys.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn single_key_is_tried_once() {
        let backend = ScriptedBackend {
            failing: vec!["key-1".into()],
            ..Default::default()
        };
        let client = GenerationClient::new(backend, pool(1));

        let err = client.generate_text("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::CredentialExhausted { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn healthy_pool_rotates_round_robin_across_calls() {
        let backend = ScriptedBackend {
            text: "ok".into(),
            ..Default::default()
        };
        let client = GenerationClient::new(backend, pool(3));

        for _ in 0..6 {
            client.generate_text("prompt").await.unwrap();
        }
        assert_eq!(
            *client.backend.used_keys.lock().unwrap(),
            vec!["key-1", "key-2", "key-3", "key-1", "key-2", "key-3"]
        );
    }

    #[tokio::test]
    async fn empty_pool_fails_without_calling_backend() {
        let backend = ScriptedBackend::default();
        let client = GenerationClient::new(backend, Arc::new(KeyPool::new(vec![])));

        let err = client.generate_text("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyCredentialSet));
        assert!(client.backend.used_keys.lock().unwrap().is_empty());
    }

    /// Backend whose first key answers garbage and second key answers valid
    /// JSON; a parse failure must rotate instead of aborting.
    #[derive(Debug)]
    struct HalfGarbageBackend {
        used_keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModelBackend for HalfGarbageBackend {
        async fn generate_text(&self, _api_key: &str, _prompt: &str) -> Result<String> {
            unreachable!("text path not under test")
        }

        async fn generate_json(
            &self,
            api_key: &str,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<String> {
            self.used_keys.lock().unwrap().push(api_key.to_string());
            if api_key == "key-1" {
                Ok("this is not json".to_string())
            } else {
                Ok("```json\n{\"value\": 42}\n```".to_string())
            }
        }

        async fn generate_image(
            &self,
            _api_key: &str,
            _prompt: &str,
            _aspect_ratio: AspectRatio,
        ) -> Result<Vec<u8>> {
            unreachable!("image path not under test")
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct Answer {
        value: u32,
    }

    #[tokio::test]
    async fn malformed_json_counts_as_key_failure_and_rotates() {
        let backend = HalfGarbageBackend {
            used_keys: Mutex::new(Vec::new()),
        };
        let client = GenerationClient::new(backend, pool(2));

        let schema = serde_json::json!({ "type": "OBJECT" });
        let answer: Answer = client.generate_json("prompt", &schema).await.unwrap();
        assert_eq!(answer.value, 42);
        assert_eq!(
            *client.backend.used_keys.lock().unwrap(),
            vec!["key-1", "key-2"]
        );
        // The garbage-answering key was marked failed along the way.
        use crate::keys::KeyStatus;
        assert_eq!(
            client.pool().statuses(),
            vec![KeyStatus::Failed, KeyStatus::Active]
        );
    }

    #[tokio::test]
    async fn empty_image_payload_rotates_to_next_key() {
        #[derive(Debug)]
        struct EmptyThenImage {
            used_keys: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl ModelBackend for EmptyThenImage {
            async fn generate_text(&self, _k: &str, _p: &str) -> Result<String> {
                unreachable!()
            }
            async fn generate_json(&self, _k: &str, _p: &str, _s: &Value) -> Result<String> {
                unreachable!()
            }
            async fn generate_image(
                &self,
                api_key: &str,
                _prompt: &str,
                _aspect_ratio: AspectRatio,
            ) -> Result<Vec<u8>> {
                self.used_keys.lock().unwrap().push(api_key.to_string());
                if api_key == "key-1" {
                    Ok(Vec::new())
                } else {
                    Ok(vec![0xFF, 0xD8])
                }
            }
        }

        let backend = EmptyThenImage {
            used_keys: Mutex::new(Vec::new()),
        };
        let client = GenerationClient::new(backend, pool(2));

        let bytes = client
            .generate_image("a thumbnail", AspectRatio::Landscape)
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8]);
        assert_eq!(
            *client.backend.used_keys.lock().unwrap(),
            vec!["key-1", "key-2"]
        );
    }

    #[test]
    fn strip_code_blocks_variants() {
        assert_eq!(strip_code_blocks("json"), "json");
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  ```json  \n  {}  \n  ```  "), "{}");
    }
}
