#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::Semaphore;

use shotgen::types::shots::ShotKind;
use shotgen::{Client, Error, GenerateShot, GeneratedImage, ImageGenerator, Result};

pub fn build_gemini_client(base_url: &str) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(base_url)
        .build()
        .unwrap()
}

/// Fake generator: records every request, fails the kinds it is told to,
/// and optionally parks each call until the test hands out a permit.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    calls: Arc<Mutex<Vec<GenerateShot>>>,
    failing: Arc<Mutex<HashSet<ShotKind>>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls block until [`ScriptedGenerator::release`] is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    pub fn fail(&self, kind: ShotKind) {
        self.failing.lock().unwrap().insert(kind);
    }

    pub fn succeed(&self, kind: ShotKind) {
        self.failing.lock().unwrap().remove(&kind);
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<GenerateShot> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Image bytes encode the kind and how many calls preceded this one.
    pub fn image_for(kind: ShotKind, call_index: usize) -> GeneratedImage {
        GeneratedImage::new(vec![kind.index() as u8, call_index as u8], "image/png")
    }
}

impl ImageGenerator for ScriptedGenerator {
    fn generate<'a>(&'a self, request: &'a GenerateShot) -> BoxFuture<'a, Result<GeneratedImage>> {
        Box::pin(async move {
            let call_index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(request.clone());
                calls.len() - 1
            };
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.failing.lock().unwrap().contains(&request.kind) {
                return Err(Error::ApiError {
                    status: 503,
                    message: format!("{} unavailable", request.kind),
                });
            }
            Ok(Self::image_for(request.kind, call_index))
        })
    }
}
