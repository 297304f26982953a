//! Condition-code to icon art resolution.
//!
//! Maps OpenWeatherMap-style condition codes onto one of eight art
//! kinds. Each kind has a bundled 16x16 bitmap asset and a remote path
//! for a richer variant; the remote fetch is bounded and any failure
//! falls back to the bundled asset.

use std::time::Duration;

use wristcast_protocol::IconBitmap;

/// Build a 16x16 icon blob from per-row bit patterns (bit 15 = x 0).
const fn bitmap16(rows: [u16; 16]) -> [u8; 34] {
    let mut blob = [0u8; 34];
    blob[0] = 16;
    blob[1] = 16;
    let mut i = 0;
    while i < 16 {
        blob[2 + i * 2] = (rows[i] >> 8) as u8;
        blob[3 + i * 2] = (rows[i] & 0xff) as u8;
        i += 1;
    }
    blob
}

const ART_CLEAR: [u8; 34] = bitmap16([
    0b0000000110000000,
    0b0000000110000000,
    0b0010000000000100,
    0b0001001111001000,
    0b0000110000110000,
    0b0000100000010000,
    0b0001000000001000,
    0b0111000000001110,
    0b0111000000001110,
    0b0001000000001000,
    0b0000100000010000,
    0b0000110000110000,
    0b0001001111001000,
    0b0010000000000100,
    0b0000000110000000,
    0b0000000110000000,
]);

const ART_LIGHT_CLOUDS: [u8; 34] = bitmap16([
    0b0000010000000000,
    0b0010000100000000,
    0b0000111000000000,
    0b0001000100000000,
    0b1101000101100000,
    0b0001000100000000,
    0b0000111001000000,
    0b0010000100000000,
    0b0000010011110000,
    0b0000001100001100,
    0b0000010000000010,
    0b0000100000000001,
    0b0000100000000001,
    0b0000010000000010,
    0b0000001111111100,
    0b0000000000000000,
]);

const ART_CLOUDS: [u8; 34] = bitmap16([
    0b0000000000000000,
    0b0000001111000000,
    0b0000010000100000,
    0b0000100000010000,
    0b0011000000001100,
    0b0100000000000010,
    0b0100000000000010,
    0b1000000000000001,
    0b1000000000000001,
    0b0111111111111110,
    0b0000000000000000,
    0b0000111111110000,
    0b0001000000001000,
    0b0010000000000100,
    0b0001111111111000,
    0b0000000000000000,
]);

const ART_LIGHT_RAIN: [u8; 34] = bitmap16([
    0b0000001111000000,
    0b0000010000100000,
    0b0001100000011000,
    0b0010000000000100,
    0b0100000000000010,
    0b0100000000000010,
    0b0011111111111100,
    0b0000000000000000,
    0b0000100000100000,
    0b0001000001000000,
    0b0000000000000000,
    0b0000010000010000,
    0b0000100000100000,
    0b0000000000000000,
    0b0000001000001000,
    0b0000010000010000,
]);

const ART_RAIN: [u8; 34] = bitmap16([
    0b0000001111000000,
    0b0000010000100000,
    0b0001100000011000,
    0b0010000000000100,
    0b0100000000000010,
    0b0100000000000010,
    0b0011111111111100,
    0b0000000000000000,
    0b0100100100100100,
    0b1001001001001000,
    0b0000000000000000,
    0b0100100100100100,
    0b1001001001001000,
    0b0000000000000000,
    0b0100100100100100,
    0b1001001001001000,
]);

const ART_STORM: [u8; 34] = bitmap16([
    0b0000001111000000,
    0b0000010000100000,
    0b0001100000011000,
    0b0010000000000100,
    0b0100000000000010,
    0b0100000000000010,
    0b0011111111111100,
    0b0000000111000000,
    0b0000001110000000,
    0b0000011100000000,
    0b0000111111000000,
    0b0000000111000000,
    0b0000001110000000,
    0b0000011000000000,
    0b0000110000000000,
    0b0000100000000000,
]);

const ART_SNOW: [u8; 34] = bitmap16([
    0b0000001111000000,
    0b0000010000100000,
    0b0001100000011000,
    0b0010000000000100,
    0b0100000000000010,
    0b0100000000000010,
    0b0011111111111100,
    0b0000000000000000,
    0b0010010000100100,
    0b0001100000011000,
    0b0111111001111110,
    0b0001100000011000,
    0b0010010000100100,
    0b0000000000000000,
    0b0000000110000000,
    0b0000001001000000,
]);

const ART_FOG: [u8; 34] = bitmap16([
    0b0000000000000000,
    0b0111111111111110,
    0b0000000000000000,
    0b0000000000000000,
    0b1111111111111000,
    0b0000000000000000,
    0b0000000000000000,
    0b0001111111111111,
    0b0000000000000000,
    0b0000000000000000,
    0b0111111111111110,
    0b0000000000000000,
    0b0000000000000000,
    0b1111111111110000,
    0b0000000000000000,
    0b0000000000000000,
]);

/// The eight icon art kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtKind {
    Storm,
    LightRain,
    Rain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Clouds,
}

impl ArtKind {
    /// The bundled asset, already in icon wire form.
    pub fn asset(&self) -> &'static [u8] {
        match self {
            ArtKind::Storm => &ART_STORM,
            ArtKind::LightRain => &ART_LIGHT_RAIN,
            ArtKind::Rain => &ART_RAIN,
            ArtKind::Snow => &ART_SNOW,
            ArtKind::Fog => &ART_FOG,
            ArtKind::Clear => &ART_CLEAR,
            ArtKind::LightClouds => &ART_LIGHT_CLOUDS,
            ArtKind::Clouds => &ART_CLOUDS,
        }
    }

    /// Path of the richer remote variant, relative to the art base URL.
    pub fn remote_path(&self) -> &'static str {
        match self {
            ArtKind::Storm => "art_storm.icn",
            ArtKind::LightRain => "art_light_rain.icn",
            ArtKind::Rain => "art_rain.icn",
            ArtKind::Snow => "art_snow.icn",
            ArtKind::Fog => "art_fog.icn",
            ArtKind::Clear => "art_clear.icn",
            ArtKind::LightClouds => "art_light_clouds.icn",
            ArtKind::Clouds => "art_clouds.icn",
        }
    }
}

/// Map a weather condition code to its icon art kind.
pub fn art_for_condition(condition_id: i64) -> Option<ArtKind> {
    let kind = match condition_id {
        200..=232 => ArtKind::Storm,
        300..=321 => ArtKind::LightRain,
        500..=504 => ArtKind::Rain,
        511 => ArtKind::Snow,
        520..=531 => ArtKind::Rain,
        600..=622 => ArtKind::Snow,
        701..=761 => ArtKind::Fog,
        781 => ArtKind::Storm,
        800 => ArtKind::Clear,
        801 => ArtKind::LightClouds,
        802..=804 => ArtKind::Clouds,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, thiserror::Error)]
pub enum ArtFetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid icon blob: {0}")]
    Decode(#[from] wristcast_protocol::IconError),
}

/// Fetch the richer remote art variant with a bounded wait.
///
/// The response body must decode as an icon blob before it is accepted.
pub async fn fetch_remote_art(
    client: &reqwest::Client,
    base_url: &str,
    kind: ArtKind,
    timeout: Duration,
) -> Result<Vec<u8>, ArtFetchError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), kind.remote_path());
    let bytes = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    IconBitmap::decode(&bytes)?;
    Ok(bytes.to_vec())
}

/// Resolve the icon blob for an art kind: remote variant when a base
/// URL is configured and reachable, bundled asset otherwise.
pub async fn resolve_art(
    client: &reqwest::Client,
    base_url: &str,
    kind: ArtKind,
    timeout: Duration,
) -> Vec<u8> {
    if base_url.is_empty() {
        return kind.asset().to_vec();
    }
    match fetch_remote_art(client, base_url, kind, timeout).await {
        Ok(blob) => blob,
        Err(e) => {
            log::warn!(
                "Error retrieving remote art for {:?}: {}; using bundled asset",
                kind,
                e
            );
            kind.asset().to_vec()
        }
    }
}
