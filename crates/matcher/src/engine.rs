use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use perceptual::Region;
use signatures::SignatureStore;

use crate::candidate::is_banner_candidate;
use crate::types::{BannerMatch, BatchMatch, ImageOutcome, MatchError, SignatureHit};

/// Matcher tuning knobs.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Distance ceiling for URL batches.
    pub threshold: u32,
    /// Stricter ceiling for single uploaded buffers.
    pub upload_threshold: u32,
    /// Per-image fetch timeout.
    pub fetch_timeout: Duration,
    /// How many image fetches run at once in a batch.
    pub max_concurrent_fetches: usize,
    /// User agent sent with image fetches. Several blog CDNs reject requests
    /// without a browser-looking UA.
    pub user_agent: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            upload_threshold: 6,
            fetch_timeout: Duration::from_secs(15),
            max_concurrent_fetches: 4,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Compares candidate images against an immutable signature snapshot.
pub struct BannerMatcher {
    store: Arc<SignatureStore>,
    client: reqwest::Client,
    config: MatcherConfig,
}

impl BannerMatcher {
    pub fn new(store: Arc<SignatureStore>, config: MatcherConfig) -> Result<Self, MatchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self {
            store,
            client,
            config,
        })
    }

    pub fn store(&self) -> &SignatureStore {
        &self.store
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Distance the buffer against every signature, sorted ascending.
    ///
    /// The buffer is hashed once per distinct region; a signature whose
    /// region cannot be resolved against this image is skipped rather than
    /// failing the whole comparison.
    pub fn compare_buffer(
        &self,
        bytes: &[u8],
        threshold: u32,
    ) -> Result<Vec<SignatureHit>, MatchError> {
        if self.store.is_empty() {
            return Err(MatchError::NoSignatures);
        }

        let mut region_hashes: Vec<(Region, u64)> = Vec::new();
        let mut hits = Vec::with_capacity(self.store.len());

        for signature in self.store.iter() {
            let hash = match region_hashes.iter().find(|(r, _)| *r == signature.region) {
                Some((_, hash)) => *hash,
                None => match perceptual::average_hash(bytes, signature.region) {
                    Ok(hash) => {
                        region_hashes.push((signature.region, hash));
                        hash
                    }
                    Err(err) => {
                        warn!(
                            signature = %signature.name,
                            region = %signature.region,
                            error = %err,
                            "skipping signature, candidate could not be hashed"
                        );
                        continue;
                    }
                },
            };

            let stored = match signature.hash_bits() {
                Ok(bits) => bits,
                Err(err) => {
                    warn!(signature = %signature.name, error = %err, "skipping invalid signature");
                    continue;
                }
            };

            let distance = perceptual::hamming(hash, stored);
            hits.push(SignatureHit {
                name: signature.name.clone(),
                region: signature.region,
                distance,
                matched: distance <= threshold,
            });
        }

        hits.sort_by_key(|hit| hit.distance);
        Ok(hits)
    }

    /// Single-buffer path for uploads. Returns the closest signature, using
    /// the stricter upload threshold unless one is passed explicitly.
    pub fn match_buffer(
        &self,
        bytes: &[u8],
        threshold: Option<u32>,
    ) -> Result<Option<SignatureHit>, MatchError> {
        let threshold = threshold.unwrap_or(self.config.upload_threshold);
        let hits = self.compare_buffer(bytes, threshold)?;
        Ok(hits.into_iter().next())
    }

    /// Fetch and match a batch of image URLs.
    ///
    /// Per-image failures are recorded in the diagnostics and never abort the
    /// batch. The winner is the minimum-distance match among images that
    /// cleared the threshold; shape eligibility is reported alongside so the
    /// decision layer can gate on it.
    pub async fn match_image_urls(
        &self,
        urls: &[String],
        threshold: Option<u32>,
    ) -> Result<BatchMatch, MatchError> {
        if self.store.is_empty() {
            return Err(MatchError::NoSignatures);
        }
        let threshold = threshold.unwrap_or(self.config.threshold);

        let details: Vec<ImageOutcome> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                match self.fetch_image(&url).await {
                    Ok(bytes) => self.match_fetched(&url, &bytes, threshold),
                    Err(err) => {
                        debug!(url = %url, error = %err, "image fetch failed");
                        ImageOutcome {
                            url,
                            best: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .buffered(self.config.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let winner = details
            .iter()
            .filter_map(|outcome| outcome.best.as_ref())
            .filter(|best| best.matched)
            .min_by_key(|best| best.distance)
            .cloned();

        debug!(
            images = urls.len(),
            matched = winner.is_some(),
            "image batch matched"
        );
        Ok(BatchMatch { winner, details })
    }

    fn match_fetched(&self, url: &str, bytes: &[u8], threshold: u32) -> ImageOutcome {
        let dimensions = image::load_from_memory(bytes)
            .map(|img| (img.width(), img.height()))
            .ok();

        let best = match self.compare_buffer(bytes, threshold) {
            Ok(hits) => hits.into_iter().next(),
            Err(err) => {
                return ImageOutcome {
                    url: url.to_string(),
                    best: None,
                    error: Some(err.to_string()),
                };
            }
        };

        match best {
            Some(hit) => {
                let banner_shaped = dimensions
                    .map(|(w, h)| is_banner_candidate(url, w, h))
                    .unwrap_or(false);
                ImageOutcome {
                    url: url.to_string(),
                    best: Some(BannerMatch {
                        url: url.to_string(),
                        source: hit.name,
                        distance: hit.distance,
                        matched: hit.matched,
                        banner_shaped,
                    }),
                    error: None,
                }
            }
            None => ImageOutcome {
                url: url.to_string(),
                best: None,
                error: Some("no signature could be compared".to_string()),
            },
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signatures::Signature;

    // Uncompressed 200x60 grayscale PNG with a horizontal gradient.
    fn gradient_png() -> Vec<u8> {
        let img = image::GrayImage::from_fn(200, 60, |x, _| image::Luma([(x * 255 / 199) as u8]));
        let mut out = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn matcher_with(signatures: Vec<Signature>) -> BannerMatcher {
        BannerMatcher::new(
            Arc::new(SignatureStore::from_signatures(signatures)),
            MatcherConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn empty_store_is_an_error() {
        let matcher = matcher_with(vec![]);
        let err = matcher.compare_buffer(&gradient_png(), 10).unwrap_err();
        assert!(matches!(err, MatchError::NoSignatures));
    }

    #[test]
    fn identical_image_matches_at_distance_zero() {
        let bytes = gradient_png();
        let hash = perceptual::average_hash(&bytes, Region::Whole).unwrap();
        let matcher = matcher_with(vec![Signature::new("self", Region::Whole, hash)]);

        let hits = matcher.compare_buffer(&bytes, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 0);
        assert!(hits[0].matched);
    }

    #[test]
    fn hits_are_sorted_ascending_by_distance() {
        let bytes = gradient_png();
        let hash = perceptual::average_hash(&bytes, Region::Whole).unwrap();
        let matcher = matcher_with(vec![
            Signature::new("far", Region::Whole, !hash),
            Signature::new("near", Region::Whole, hash),
        ]);

        let hits = matcher.compare_buffer(&bytes, 10).unwrap();
        assert_eq!(hits[0].name, "near");
        assert_eq!(hits[0].distance, 0);
        assert_eq!(hits[1].name, "far");
        assert_eq!(hits[1].distance, 64);
        assert!(!hits[1].matched);
    }

    #[test]
    fn undecodable_buffer_yields_no_hits() {
        let hash = 0xdead_beef_0000_ffff;
        let matcher = matcher_with(vec![Signature::new("x", Region::Whole, hash)]);
        let hits = matcher.compare_buffer(b"not an image", 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn match_buffer_uses_strict_upload_threshold() {
        let bytes = gradient_png();
        let hash = perceptual::average_hash(&bytes, Region::Whole).unwrap();
        // Flip 8 bits: outside the upload threshold of 6, inside batch's 10.
        let matcher = matcher_with(vec![Signature::new("x", Region::Whole, hash ^ 0xff)]);

        let best = matcher.match_buffer(&bytes, None).unwrap().unwrap();
        assert_eq!(best.distance, 8);
        assert!(!best.matched);

        let relaxed = matcher.match_buffer(&bytes, Some(10)).unwrap().unwrap();
        assert!(relaxed.matched);
    }

    #[tokio::test]
    async fn batch_with_unreachable_urls_reports_per_image_errors() {
        let matcher = matcher_with(vec![Signature::new("x", Region::Whole, 0)]);
        let urls = vec!["http://127.0.0.1:1/none.png".to_string()];

        let batch = matcher.match_image_urls(&urls, None).await.unwrap();
        assert!(batch.winner.is_none());
        assert_eq!(batch.details.len(), 1);
        assert!(batch.details[0].error.is_some());
    }
}
