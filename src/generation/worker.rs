use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use super::{GenerationOutcome, GenerationRequest, SoundProvider};
use crate::errors::GenerationError;
use crate::loader::{decode_bytes, SoundCache};

// One thread per request, so a slow generation on one pad never holds up another pad or
// the ui loop. Finished requests pile up in a channel the loop drains every frame.
pub struct GenerationWorker {
    provider: Arc<dyn SoundProvider>,
    cache: Option<SoundCache>,
    sample_rate: u32,
    tx: Sender<GenerationOutcome>,
    rx: Receiver<GenerationOutcome>,
}

impl GenerationWorker {
    pub fn new(provider: Arc<dyn SoundProvider>, cache: Option<SoundCache>, sample_rate: u32) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { provider, cache, sample_rate, tx, rx }
    }

    pub fn submit(&self, req: GenerationRequest, api_key: Option<String>) {
        let tx = self.tx.clone();

        // fail fast, no point spinning up a thread to not make a request
        let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
            let _ = tx.send(GenerationOutcome {
                pad: req.pad,
                token: req.token,
                prompt: req.prompt,
                result: Err(GenerationError::MissingApiKey),
            });
            return;
        };

        let provider = Arc::clone(&self.provider);
        let cache = self.cache.clone();
        let sample_rate = self.sample_rate;
        std::thread::spawn(move || {
            log::info!("generating sound for pad {}", req.pad.0);
            let result = provider
                .generate(&api_key, &req.prompt)
                .and_then(|bytes| decode_bytes(bytes, sample_rate));

            if let (Ok(buffer), Some(cache)) = (&result, &cache) {
                if let Err(e) = cache.store(&req.prompt, buffer, sample_rate) {
                    log::warn!("could not cache generated sound: {e}");
                }
            }
            if let Err(e) = &result {
                log::warn!("generation for pad {} failed: {e}", req.pad.0);
            }
            let _ = tx.send(GenerationOutcome {
                pad: req.pad,
                token: req.token,
                prompt: req.prompt,
                result,
            });
        });
    }

    pub fn poll(&self) -> Option<GenerationOutcome> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn wait(&self, timeout: std::time::Duration) -> Option<GenerationOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::loader::decode::tests::wav_bytes;
    use crate::shared::PadId;

    struct FakeProvider {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    impl FakeProvider {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: None }
        }
        fn failing(status: u16) -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: Some(status) }
        }
    }

    impl SoundProvider for FakeProvider {
        fn generate(&self, _api_key: &str, _prompt: &str) -> Result<Vec<u8>, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(GenerationError::Status { status }),
                None => Ok(wav_bytes(1, 44100, 441)),
            }
        }
    }

    fn request(pad: u8) -> GenerationRequest {
        GenerationRequest { pad: PadId(pad), token: 7, prompt: "A magical sparkle effect".into() }
    }

    #[test]
    fn success_decodes_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SoundCache::new(dir.path());
        let provider = Arc::new(FakeProvider::ok());
        let worker = GenerationWorker::new(provider.clone(), Some(cache.clone()), 44100);

        worker.submit(request(12), Some("key".into()));
        let outcome = worker.wait(Duration::from_secs(5)).expect("outcome");
        assert_eq!(outcome.pad, PadId(12));
        assert_eq!(outcome.token, 7);
        assert_eq!(outcome.result.unwrap().len(), 441);
        assert!(cache.path_for("A magical sparkle effect").exists());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_key_never_calls_provider() {
        let provider = Arc::new(FakeProvider::ok());
        let worker = GenerationWorker::new(provider.clone(), None, 44100);

        worker.submit(request(0), Some("   ".into()));
        let outcome = worker.poll().expect("immediate outcome");
        assert!(matches!(outcome.result, Err(GenerationError::MissingApiKey)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn http_failure_is_reported() {
        let worker = GenerationWorker::new(Arc::new(FakeProvider::failing(401)), None, 44100);
        worker.submit(request(3), Some("bad".into()));
        let outcome = worker.wait(Duration::from_secs(5)).expect("outcome");
        assert!(matches!(outcome.result, Err(GenerationError::Status { status: 401 })));
    }
}
