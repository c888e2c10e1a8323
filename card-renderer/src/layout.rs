//! Fixed geometry of the result card.

use image::Rgba;

pub const CARD_WIDTH: u32 = 700;
pub const CARD_HEIGHT: u32 = 250;

pub const PROFILE_PIC_SIZE: u32 = 98;
pub const PROFILE_PIC_POS: (u32, u32) = (50, 25);

pub const FRIEND_PIC_SIZE: u32 = 50;
pub const FRIEND_ROW_Y: u32 = 145;
pub const FRIEND_ROW_X: u32 = 50;
pub const FRIEND_PIC_SPACING: u32 = 10;
pub const MAX_FRIEND_AVATARS: usize = 10;

pub const USERNAME_POS: (i32, i32) = (180, 35);
pub const USERNAME_PX: f32 = 32.0;
pub const USERNAME_COLOR: Rgba<u8> = Rgba([188, 188, 188, 255]);

pub const FOLLOWERS_POS: (i32, i32) = (190, 82);
pub const FOLLOWERS_PX: f32 = 14.0;
pub const FOLLOWERS_COLOR: Rgba<u8> = Rgba([92, 92, 92, 255]);

/// Left edge of the `index`-th avatar in the friend row.
pub fn friend_slot_x(index: usize) -> u32 {
    FRIEND_ROW_X + index as u32 * (FRIEND_PIC_SIZE + FRIEND_PIC_SPACING)
}

pub fn format_follower_count(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn followers_text(count: u64) -> String {
    format!("Followers: {}", format_follower_count(count))
}
