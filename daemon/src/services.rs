//! Wires the configured engines, stores and key material into the services.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use boda_crypto::KeyMaterial;
use boda_document::TextExtractor;
use boda_identity::{AuditLog, IdentityStore};
use boda_photo::{
    AuthenticityAnalyzer, CommandFaceEmbedder, EmbeddingFaceDetector, FaceDetector, FaceEmbedder,
    FaceMatcher,
};
use boda_store::RiderDirectory;
use boda_store_lmdb::LmdbEnvironment;
use boda_types::{Clock, SystemClock};
use boda_verification::{Orchestrator, SignalSources};
use tracing::info;

use crate::config::VerifierConfig;
use crate::directory::JsonDirectory;

pub struct Services {
    pub identity: Arc<IdentityStore>,
    pub orchestrator: Orchestrator,
}

/// Open storage and assemble the identity store and orchestrator.
pub fn build(config: &VerifierConfig, keys: KeyMaterial) -> anyhow::Result<Services> {
    let db_path = config.db_path();
    let env = LmdbEnvironment::open(&db_path, config.map_size)
        .with_context(|| format!("opening store at {}", db_path.display()))?;
    let directory: Arc<dyn RiderDirectory> = Arc::new(
        JsonDirectory::load(&config.directory_path()).context("loading rider directory")?,
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let identity = Arc::new(
        IdentityStore::new(
            Arc::new(env.identity_store()),
            directory.clone(),
            AuditLog::new(Arc::new(env.audit_store()), clock.clone()),
            Arc::new(keys),
            clock.clone(),
        )
        .with_format(config.id_format.clone()),
    );

    let signals = signal_sources(config)?;
    let orchestrator = Orchestrator::new(
        identity.clone(),
        Arc::new(env.verification_store()),
        directory,
        signals,
        clock,
    )
    .with_scoring(config.scoring.clone());

    Ok(Services {
        identity,
        orchestrator,
    })
}

fn signal_sources(config: &VerifierConfig) -> anyhow::Result<SignalSources> {
    let face = &config.face;
    let embedder: Option<Arc<dyn FaceEmbedder>> = face.embedder.as_ref().map(|program| {
        Arc::new(
            CommandFaceEmbedder::new(program, face.embedder_args.clone())
                .with_timeout(Duration::from_millis(face.embedder_timeout_ms)),
        ) as Arc<dyn FaceEmbedder>
    });
    let detector: Option<Arc<dyn FaceDetector>> = match &embedder {
        Some(embedder) if face.detect_with_embedder => {
            Some(Arc::new(EmbeddingFaceDetector::new(embedder.clone())) as Arc<dyn FaceDetector>)
        }
        _ => None,
    };
    let extractor = TextExtractor::from_config(&config.ocr).context("building OCR parser")?;
    info!(
        embedder = face.embedder.is_some(),
        detector = detector.is_some(),
        ocr = extractor.engine_name(),
        "analysis engines configured"
    );

    Ok(SignalSources {
        analyzer: AuthenticityAnalyzer::new(config.authenticity.clone(), detector),
        matcher: FaceMatcher::new(embedder, face.matching.clone()),
        extractor,
    })
}
