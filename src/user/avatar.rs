use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mongodb::bson::{Binary, Bson, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};

pub const LETTER_AVATAR_PREFIX: &str = "letter-avatar:";
pub const DEFAULT_INITIALS: &str = "U";
pub const DEFAULT_COLOR: &str = "#3498db";

const AVATAR_COLORS: [&str; 30] = [
    "#1abc9c", "#2ecc71", "#3498db", "#9b59b6", "#34495e", "#16a085", "#27ae60", "#2980b9",
    "#8e44ad", "#2c3e50", "#f1c40f", "#e67e22", "#e74c3c", "#ecf0f1", "#95a5a6", "#f39c12",
    "#d35400", "#c0392b", "#bdc3c7", "#7f8c8d", "#6366f1", "#8b5cf6", "#ec4899", "#ef4444",
    "#f97316", "#84cc16", "#14b8a6", "#06b6d4", "#0ea5e9", "#8b5cf6",
];

/// A user's picture. Stored in the `image` field as either a
/// `letter-avatar:INITIALS:COLOR` string, a `{data, contentType}` blob or a
/// plain URL string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Bson", into = "Bson")]
pub enum Avatar {
    Generated { initials: String, color: String },
    Stored { data: Vec<u8>, content_type: String },
    Linked { url: String },
}

impl Default for Avatar {
    fn default() -> Self {
        Avatar::Generated {
            initials: DEFAULT_INITIALS.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Up to two upper-cased initials: first and last word, or the first letter of a single word.
pub fn initials(name: &str) -> String {
    if name.is_empty() {
        return "?".to_string();
    }

    let parts: Vec<&str> = name.split(' ').collect();
    let first_char = |s: &str| s.chars().next().map(String::from).unwrap_or_default();

    let raw = if parts.len() >= 2 {
        format!("{}{}", first_char(parts[0]), first_char(parts[parts.len() - 1]))
    } else {
        first_char(name)
    };
    raw.to_uppercase()
}

/// Picks a palette color from a 32-bit shift hash over the UTF-16 units of `name`.
pub fn avatar_color(name: &str) -> &'static str {
    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        hash = unit as i64 + (shifted - hash);
    }

    let index = (hash.unsigned_abs() % AVATAR_COLORS.len() as u64) as usize;
    AVATAR_COLORS[index]
}

pub fn letter_avatar(name: &str) -> Avatar {
    Avatar::Generated {
        initials: initials(name),
        color: avatar_color(name).to_string(),
    }
}

impl Avatar {
    /// Reads the string form of the field: a letter avatar or a link.
    pub fn parse(value: &str) -> Avatar {
        match value.strip_prefix(LETTER_AVATAR_PREFIX) {
            Some(rest) => match rest.split_once(':') {
                Some((initials, color)) if !initials.is_empty() && !color.is_empty() => {
                    Avatar::Generated {
                        initials: initials.to_string(),
                        color: color.to_string(),
                    }
                }
                _ => Avatar::default(),
            },
            None => Avatar::Linked {
                url: value.to_string(),
            },
        }
    }

    /// Image path as delivered by an OAuth provider: URLs are kept, anything else is
    /// reduced to its file name.
    pub fn from_provider_image(image: &str) -> Avatar {
        if image.starts_with("http") {
            return Avatar::Linked {
                url: image.to_string(),
            };
        }
        let file = image.rsplit('/').next().unwrap_or(image);
        Avatar::Linked {
            url: file.to_string(),
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Avatar::Stored { .. })
    }

    pub fn data_url(&self) -> Option<String> {
        match self {
            Avatar::Stored { data, content_type } => Some(format!(
                "data:{};base64,{}",
                content_type,
                STANDARD.encode(data)
            )),
            _ => None,
        }
    }

    /// Short displayable reference, used for post cards and commenter lists.
    /// Stored blobs are referenced through the image endpoint of their owner.
    pub fn reference(&self, owner_id: &str) -> String {
        match self {
            Avatar::Generated { initials, color } => {
                format!("{}{}:{}", LETTER_AVATAR_PREFIX, initials, color)
            }
            Avatar::Stored { .. } => format!("/api/users/{}/image", owner_id),
            Avatar::Linked { url } => {
                if url.starts_with("http") || url.starts_with('/') || url.starts_with("data:") {
                    url.clone()
                } else {
                    format!("/images/{}", url)
                }
            }
        }
    }

    /// Avatar shown for a signed-in user. Missing pictures and the stock
    /// `avatar.png` fall back to the letter avatar of `display_name`.
    pub fn resolve(avatar: Option<&Avatar>, display_name: &str) -> Avatar {
        match avatar {
            None => letter_avatar(display_name),
            Some(Avatar::Linked { url }) if url.is_empty() || url == "avatar.png" => {
                letter_avatar(display_name)
            }
            Some(other) => other.clone(),
        }
    }
}

impl From<Bson> for Avatar {
    fn from(value: Bson) -> Self {
        match value {
            Bson::String(s) => Avatar::parse(&s),
            Bson::Document(d) => {
                let data = d.get_binary_generic("data").ok().cloned();
                let content_type = d.get_str("contentType").ok().map(str::to_string);
                match (data, content_type) {
                    (Some(data), Some(content_type)) => Avatar::Stored { data, content_type },
                    _ => Avatar::default(),
                }
            }
            _ => Avatar::default(),
        }
    }
}

impl From<Avatar> for Bson {
    fn from(value: Avatar) -> Self {
        match value {
            Avatar::Stored { data, content_type } => Bson::Document(doc! {
                "data": Binary { subtype: BinarySubtype::Generic, bytes: data },
                "contentType": content_type,
            }),
            Avatar::Generated { initials, color } => {
                Bson::String(format!("{}{}:{}", LETTER_AVATAR_PREFIX, initials, color))
            }
            Avatar::Linked { url } => Bson::String(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_of_names() {
        assert_eq!(initials("Jane Doe"), "JD");
        assert_eq!(initials("jane middle doe"), "JD");
        assert_eq!(initials("alice"), "A");
        assert_eq!(initials(""), "?");
    }

    #[test]
    fn color_is_stable_and_known() {
        assert_eq!(avatar_color("Jane Doe"), "#e74c3c");
        assert_eq!(avatar_color("Alice"), "#0ea5e9");
        assert_eq!(avatar_color("Bob Smith"), "#f97316");
        assert_eq!(avatar_color(""), "#1abc9c");
        assert_eq!(avatar_color("Jane Doe"), avatar_color("Jane Doe"));
    }

    #[test]
    fn long_names_keep_the_wide_hash() {
        // the running hash leaves the 32-bit range here
        assert_eq!(
            avatar_color("A very long name that overflows the thirty two bit range"),
            "#16a085"
        );
    }

    #[test]
    fn letter_avatar_reference() {
        assert_eq!(
            letter_avatar("Jane Doe").reference("id"),
            "letter-avatar:JD:#e74c3c"
        );
    }

    #[test]
    fn parse_recognises_each_shape() {
        assert_eq!(
            Avatar::parse("letter-avatar:JD:#e74c3c"),
            Avatar::Generated {
                initials: "JD".into(),
                color: "#e74c3c".into()
            }
        );
        assert_eq!(Avatar::parse("letter-avatar:broken"), Avatar::default());
        assert_eq!(
            Avatar::parse("https://cdn/x.png"),
            Avatar::Linked {
                url: "https://cdn/x.png".into()
            }
        );
    }

    #[test]
    fn bson_shapes_survive_storage() {
        let stored = Avatar::Stored {
            data: vec![1, 2, 3],
            content_type: "image/png".into(),
        };
        assert_eq!(Avatar::from(Bson::from(stored.clone())), stored);

        let generated = letter_avatar("Jane Doe");
        assert_eq!(
            Bson::from(generated.clone()),
            Bson::String("letter-avatar:JD:#e74c3c".into())
        );
        assert_eq!(Avatar::from(Bson::Null), Avatar::default());
    }

    #[test]
    fn resolve_falls_back_to_letters() {
        let stock = Avatar::Linked {
            url: "avatar.png".into(),
        };
        assert_eq!(
            Avatar::resolve(Some(&stock), "Jane Doe"),
            letter_avatar("Jane Doe")
        );
        assert_eq!(Avatar::resolve(None, "Alice"), letter_avatar("Alice"));
    }

    #[test]
    fn references_for_links_and_blobs() {
        let bare = Avatar::Linked {
            url: "photo.jpg".into(),
        };
        assert_eq!(bare.reference("u1"), "/images/photo.jpg");

        let blob = Avatar::Stored {
            data: vec![0xff],
            content_type: "image/jpeg".into(),
        };
        assert_eq!(blob.reference("u1"), "/api/users/u1/image");
        assert_eq!(blob.data_url().unwrap(), "data:image/jpeg;base64,/w==");
    }

    #[test]
    fn provider_images_keep_file_name() {
        assert_eq!(
            Avatar::from_provider_image("/static/pics/me.png"),
            Avatar::Linked {
                url: "me.png".into()
            }
        );
    }
}
