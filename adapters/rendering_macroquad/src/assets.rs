use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use image::{imageops::FilterType, ImageFormat, RgbaImage};
use macroquad::{
    miniquad::conf::Icon,
    text::{load_ttf_font_from_bytes, Font},
    texture::Texture2D,
};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Errors raised while validating the asset manifest and the files it names.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest is not valid TOML or does not match the expected layout.
    #[error("failed to parse asset manifest: {0}")]
    Parse(#[from] toml::de::Error),
    /// The manifest declares a version this adapter does not understand.
    #[error(
        "unsupported asset manifest version {found}; expected {expected}",
        expected = SUPPORTED_MANIFEST_VERSION
    )]
    UnsupportedVersion {
        /// Version declared by the manifest.
        found: u32,
    },
    /// An image referenced by the manifest is not a PNG file.
    #[error("asset at {} is not a PNG image", path.display())]
    NotPng {
        /// Path of the offending file.
        path: PathBuf,
    },
    /// An image carries a PNG signature but its contents cannot be decoded.
    #[error("asset at {} is a corrupt PNG image", path.display())]
    Decode {
        /// Path of the offending file.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: image::ImageError,
    },
    /// An image is too large to upload as a texture.
    #[error("asset at {} is {width}x{height} pixels, larger than a texture allows", path.display())]
    Oversized {
        /// Path of the offending file.
        path: PathBuf,
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
}

/// File locations resolved from the asset manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetPaths {
    /// Image drawn on the food cell.
    pub food: PathBuf,
    /// Image used as the window icon, if any.
    pub icon: Option<PathBuf>,
    /// Font used for HUD text; the built-in font is used when absent.
    pub font: Option<PathBuf>,
}

impl AssetPaths {
    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Parses manifest contents, resolving entries relative to `base_path`.
    pub fn parse(contents: &str, base_path: &Path) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(contents)?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                found: manifest.version,
            });
        }

        Ok(Self {
            food: base_path.join(manifest.assets.food),
            icon: manifest.assets.icon.map(|icon| base_path.join(icon)),
            font: manifest.assets.font.map(|font| base_path.join(font)),
        })
    }

    /// Reads and parses the manifest stored at `path`.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read asset manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&contents, &base)
            .with_context(|| format!("invalid asset manifest {}", manifest_path.display()))
    }
}

/// Textures and fonts loaded once the window exists.
#[derive(Debug)]
pub struct GameAssets {
    food: Texture2D,
    font: Option<Font>,
}

impl GameAssets {
    /// Loads the food texture and the optional font named by `paths`.
    pub fn from_paths(paths: &AssetPaths) -> Result<Self> {
        Self::from_paths_with_loaders(paths, load_texture, load_font)
    }

    /// Texture drawn on the food cell.
    #[must_use]
    pub fn food(&self) -> Texture2D {
        self.food
    }

    /// Font used for HUD text, if the manifest provides one.
    #[must_use]
    pub fn font(&self) -> Option<Font> {
        self.font
    }

    fn from_paths_with_loaders(
        paths: &AssetPaths,
        mut texture_loader: impl FnMut(&Path) -> Result<Texture2D>,
        mut font_loader: impl FnMut(&Path) -> Result<Font>,
    ) -> Result<Self> {
        let food = texture_loader(&paths.food).with_context(|| {
            format!("failed to load food image from {}", paths.food.display())
        })?;
        let font = match &paths.font {
            Some(path) => Some(
                font_loader(path)
                    .with_context(|| format!("failed to load font from {}", path.display()))?,
            ),
            None => None,
        };
        Ok(Self { food, font })
    }
}

/// Decodes the PNG at `path` into the three square sizes a window icon carries.
///
/// Runs before the window exists, so it touches no graphics state.
pub fn load_window_icon(path: impl AsRef<Path>) -> Result<Icon> {
    let path = path.as_ref();
    let image = decode_png(&read_asset(path)?, path)?;
    Ok(Icon {
        small: icon_layer::<{ 16 * 16 * 4 }>(&image, 16)?,
        medium: icon_layer::<{ 32 * 32 * 4 }>(&image, 32)?,
        big: icon_layer::<{ 64 * 64 * 4 }>(&image, 64)?,
    })
}

fn icon_layer<const LEN: usize>(image: &RgbaImage, side: u32) -> Result<[u8; LEN]> {
    let resized = image::imageops::resize(image, side, side, FilterType::Triangle);
    <[u8; LEN]>::try_from(resized.into_raw())
        .map_err(|raw| anyhow!("{side}px icon holds {} bytes, expected {LEN}", raw.len()))
}

fn load_texture(path: &Path) -> Result<Texture2D> {
    let image = decode_png(&read_asset(path)?, path)?;
    let (width, height) = image.dimensions();
    let (Ok(texture_width), Ok(texture_height)) = (u16::try_from(width), u16::try_from(height))
    else {
        return Err(ManifestError::Oversized {
            path: path.to_path_buf(),
            width,
            height,
        }
        .into());
    };
    Ok(Texture2D::from_rgba8(
        texture_width,
        texture_height,
        image.as_raw(),
    ))
}

fn load_font(path: &Path) -> Result<Font> {
    let bytes = read_asset(path)?;
    load_ttf_font_from_bytes(&bytes).map_err(|error| anyhow!("{error:?}"))
}

fn read_asset(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read asset at {}", path.display()))
}

fn decode_png(bytes: &[u8], path: &Path) -> Result<RgbaImage, ManifestError> {
    if !is_png(bytes) {
        return Err(ManifestError::NotPng {
            path: path.to_path_buf(),
        });
    }
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| ManifestError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    assets: ManifestAssets,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestAssets {
    food: String,
    icon: Option<String>,
    font: Option<String>,
}
