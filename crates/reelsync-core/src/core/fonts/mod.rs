//! Caption Font Resolution
//!
//! The caption face is resolved once per process. A custom font file is used
//! when it exists and looks like a font; otherwise captions fall back to the
//! system stack. Either way the result is a plain value handed to callers.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{info, warn};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Global State
// =============================================================================

/// First resolution wins for the lifetime of the process
static CAPTION_FONT: OnceLock<CaptionFont> = OnceLock::new();

/// Family name the custom caption face is registered under
pub const CAPTION_FONT_FAMILY: &str = "CaptionFont";

/// Default location of the bold caption face
pub const DEFAULT_FONT_PATH: &str = "fonts/bold.ttf";

/// System families tried after the custom face
pub const SYSTEM_FONT_STACK: &[&str] = &[
    "-apple-system",
    "BlinkMacSystemFont",
    "'Segoe UI'",
    "Roboto",
    "sans-serif",
];

/// Leading bytes of TrueType, OpenType and WOFF files
const FONT_SIGNATURES: &[[u8; 4]] = &[
    [0x00, 0x01, 0x00, 0x00],
    *b"OTTO",
    *b"true",
    *b"wOFF",
    *b"wOF2",
];

// =============================================================================
// Caption Font
// =============================================================================

/// Where the caption face comes from
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FontSource {
    /// A font file that passed the signature check
    Custom { path: PathBuf },
    /// Only system fonts are available
    System,
}

/// Result of the one-shot caption font resolution
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionFont {
    pub source: FontSource,
}

impl CaptionFont {
    /// Probes `path` and falls back to the system stack on any failure
    pub fn resolve(path: &Path) -> Self {
        match probe_font_file(path) {
            Ok(()) => {
                info!("Loaded caption font from {:?}", path);
                Self {
                    source: FontSource::Custom {
                        path: path.to_path_buf(),
                    },
                }
            }
            Err(e) => {
                warn!("Custom caption font not available, using system fallback: {}", e);
                Self::system()
            }
        }
    }

    /// System fonts only
    pub fn system() -> Self {
        Self {
            source: FontSource::System,
        }
    }

    /// Returns true if the custom face was loaded
    pub fn is_custom(&self) -> bool {
        matches!(self.source, FontSource::Custom { .. })
    }

    /// Families in priority order
    pub fn families(&self) -> Vec<&'static str> {
        let custom = self.is_custom().then_some(CAPTION_FONT_FAMILY);
        custom.into_iter().chain(SYSTEM_FONT_STACK.iter().copied()).collect()
    }

    /// CSS-style `font-family` value
    pub fn font_stack(&self) -> String {
        self.families().join(", ")
    }
}

/// Resolves the caption font on first call and returns the cached result after
///
/// Later calls ignore `path`.
pub fn caption_font(path: &Path) -> &'static CaptionFont {
    CAPTION_FONT.get_or_init(|| CaptionFont::resolve(path))
}

fn probe_font_file(path: &Path) -> CoreResult<()> {
    let mut header = [0u8; 4];
    File::open(path)?.read_exact(&mut header)?;

    if !FONT_SIGNATURES.contains(&header) {
        return Err(CoreError::ValidationError(format!(
            "{} is not a TrueType/OpenType/WOFF file",
            path.display()
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
