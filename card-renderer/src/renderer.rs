use crate::avatar::AvatarSource;
use crate::compose::{circular_avatar, draw_text, fit_background};
use crate::layout::*;
use image::imageops;
use image::{DynamicImage, ImageFormat, RgbaImage};
use rusttype::Font;
use std::path::{Path, PathBuf};
use threadcard_core::{validate_username, CardConfig, CoreError, RankedFriend, RenderError};
use tracing::{debug, info, warn};

/// What goes on one card.
#[derive(Debug, Clone)]
pub struct CardRequest {
    pub username: String,
    pub follower_count: u64,
    pub profile_pic_url: Option<String>,
    pub friends: Vec<RankedFriend>,
}

/// Downloaded avatar bytes, in card order. `None` leaves the slot empty.
struct AvatarBytes {
    profile: Option<Vec<u8>>,
    friends: Vec<Option<Vec<u8>>>,
}

#[derive(Debug, Clone)]
pub struct CardRenderer {
    config: CardConfig,
}

impl CardRenderer {
    pub fn new(config: CardConfig) -> Self {
        Self { config }
    }

    pub fn output_path(&self, username: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}_result_image.png", username))
    }

    /// Draws the card for `card` and writes it as PNG, returning the path.
    ///
    /// Avatars that cannot be downloaded or decoded are logged and left out;
    /// a missing background is an error.
    pub async fn render<S: AvatarSource>(
        &self,
        card: &CardRequest,
        avatars: &S,
    ) -> Result<PathBuf, CoreError> {
        validate_username(&card.username)?;

        let profile = match &card.profile_pic_url {
            Some(url) => fetch_avatar(avatars, url, &card.username).await,
            None => None,
        };

        let mut friends = Vec::with_capacity(card.friends.len().min(MAX_FRIEND_AVATARS));
        for friend in card.friends.iter().take(MAX_FRIEND_AVATARS) {
            let bytes = match &friend.profile_pic_url {
                Some(url) => fetch_avatar(avatars, url, &friend.username).await,
                None => None,
            };
            friends.push(bytes);
        }

        let config = self.config.clone();
        let card = card.clone();
        let output_path = self.output_path(&card.username);
        tokio::task::spawn_blocking(move || {
            let image = compose_card(&config, &card, AvatarBytes { profile, friends })?;
            save_card(&image, &output_path)?;
            Ok::<_, CoreError>(output_path)
        })
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("Card rendering task failed: {}", e),
        })?
    }
}

async fn fetch_avatar<S: AvatarSource>(avatars: &S, url: &str, owner: &str) -> Option<Vec<u8>> {
    match avatars.fetch(url).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Error loading profile picture for {}: {}", owner, e);
            None
        }
    }
}

fn decode_avatar(bytes: &[u8], size: u32) -> Option<RgbaImage> {
    match image::load_from_memory(bytes) {
        Ok(decoded) => Some(circular_avatar(&decoded, size)),
        Err(e) => {
            warn!("Skipping undecodable profile picture: {}", e);
            None
        }
    }
}

fn load_background(path: &Path) -> Result<DynamicImage, RenderError> {
    image::open(path).map_err(|e| {
        warn!("Cannot open background {}: {}", path.display(), e);
        RenderError::BackgroundUnavailable {
            path: path.display().to_string(),
        }
    })
}

/// A card without text beats no card, so an unusable font is only a warning.
fn load_font(path: &Path) -> Option<Font<'static>> {
    let font = std::fs::read(path).ok().and_then(Font::try_from_vec);
    if font.is_none() {
        warn!("Font {} unavailable, drawing card without text", path.display());
    }
    font
}

fn compose_card(
    config: &CardConfig,
    card: &CardRequest,
    avatars: AvatarBytes,
) -> Result<RgbaImage, RenderError> {
    let background = load_background(&config.background_path)?;
    let mut canvas = fit_background(&background, CARD_WIDTH, CARD_HEIGHT);

    if let Some(font) = load_font(&config.font_path) {
        draw_text(
            &mut canvas,
            &font,
            USERNAME_PX,
            USERNAME_POS.0,
            USERNAME_POS.1,
            USERNAME_COLOR,
            &card.username,
        );
        draw_text(
            &mut canvas,
            &font,
            FOLLOWERS_PX,
            FOLLOWERS_POS.0,
            FOLLOWERS_POS.1,
            FOLLOWERS_COLOR,
            &followers_text(card.follower_count),
        );
    }

    if let Some(avatar) = avatars
        .profile
        .as_deref()
        .and_then(|bytes| decode_avatar(bytes, PROFILE_PIC_SIZE))
    {
        imageops::overlay(
            &mut canvas,
            &avatar,
            PROFILE_PIC_POS.0.into(),
            PROFILE_PIC_POS.1.into(),
        );
    }

    let mut drawn = 0;
    for (index, bytes) in avatars.friends.iter().enumerate() {
        // the slot is consumed whether or not the avatar loads
        let Some(avatar) = bytes
            .as_deref()
            .and_then(|bytes| decode_avatar(bytes, FRIEND_PIC_SIZE))
        else {
            continue;
        };
        imageops::overlay(
            &mut canvas,
            &avatar,
            friend_slot_x(index).into(),
            FRIEND_ROW_Y.into(),
        );
        drawn += 1;
    }
    debug!(
        "Composed card for {} with {} of {} friend avatars",
        card.username,
        drawn,
        avatars.friends.len()
    );

    Ok(canvas)
}

fn save_card(canvas: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|_| RenderError::OutputUnavailable {
            path: dir.display().to_string(),
        })?;
    }

    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    rgb.save_with_format(path, ImageFormat::Png)?;
    info!("Saved result card to {}", path.display());
    Ok(())
}
