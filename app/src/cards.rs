//! Printable identity card data.
//!
//! Each member gets a printed card carrying their display name, id, color
//! tag and a scannable token image. The image itself comes from an external
//! token-image service that turns the encoded [`TokenPayload`] into a raster
//! image; rendering and printing are out of scope, this module only
//! assembles the data a card needs and can fetch the image bytes for a
//! per-member download.

use llavero_core::member::{Member, MemberRegistry};
use llavero_core::resolver::TokenPayload;
use reqwest::Url;
use thiserror::Error;

/// External service that renders a payload into a scannable image.
const TOKEN_IMAGE_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Pixel size of the image embedded in a printed card.
const CARD_IMAGE_SIZE: &str = "150x150";

/// Pixel size of the downloadable image.
const DOWNLOAD_IMAGE_SIZE: &str = "300x300";

/// Foreground color of the generated image.
const IMAGE_COLOR: &str = "334155";

/// Errors assembling or fetching card data.
#[derive(Error, Debug)]
pub enum CardError {
    /// The token payload could not be serialized.
    #[error("failed to encode token payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The token-image service URL could not be built.
    #[error("invalid token image URL: {0}")]
    BadUrl(String),

    /// The token-image service request failed.
    #[error("token image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Everything a rendered identity card needs.
#[derive(Clone, Debug)]
pub struct MemberCard {
    /// The member the card identifies
    pub member: Member,
    /// URL of the card-sized token image
    pub token_image_url: Url,
}

/// Builds the token image URL for a member at the given pixel size.
fn token_image_url(member: &Member, size: &str) -> Result<Url, CardError> {
    let payload = TokenPayload::for_member(member).encode()?;
    Url::parse_with_params(
        TOKEN_IMAGE_ENDPOINT,
        &[("size", size), ("data", &payload), ("color", IMAGE_COLOR)],
    )
    .map_err(|e| CardError::BadUrl(e.to_string()))
}

/// Card data for one member.
///
/// # Errors
///
/// - [`CardError::Encode`] / [`CardError::BadUrl`]: the token payload or
///   image URL could not be built
pub fn card_for(member: &Member) -> Result<MemberCard, CardError> {
    Ok(MemberCard {
        member: member.clone(),
        token_image_url: token_image_url(member, CARD_IMAGE_SIZE)?,
    })
}

/// Card data for the whole registry, in registry order.
///
/// # Errors
///
/// Same as [`card_for`] for the first failing member.
pub fn cards_for(registry: &MemberRegistry) -> Result<Vec<MemberCard>, CardError> {
    registry.iter().map(card_for).collect()
}

/// Fetches the downloadable token image for a member.
///
/// Returns the raw image bytes; the caller decides where they go (a file
/// named after the member, in the original deployment).
///
/// # Errors
///
/// - [`CardError::Fetch`]: the token-image service was unreachable or
///   returned a non-success status
pub async fn download_token_image(
    client: &reqwest::Client,
    member: &Member,
) -> Result<Vec<u8>, CardError> {
    let url = token_image_url(member, DOWNLOAD_IMAGE_SIZE)?;
    tracing::info!(member = %member.id, %url, "fetching token image");

    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Suggested file name for a downloaded token image.
#[must_use]
pub fn token_image_file_name(member: &Member) -> String {
    format!("QR_{}.png", member.display_name)
}
