pub mod templates;

use crate::{
    error::CardResult,
    solvedac::user::UserRecord,
    utils::{escape_xml, group_thousands},
};
use minijinja::{context, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use templates::CardTemplate;

static REGEX_HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{6})$").unwrap());

/// Served when even the error card cannot be rendered.
pub const FALLBACK_ERROR_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="560" height="140" viewBox="0 0 560 140" xmlns="http://www.w3.org/2000/svg">
  <rect width="560" height="140" rx="18" fill="#FFFFFF"/>
  <text x="22" y="54" fill="#DC2626" font-size="16" font-weight="900">Error</text>
</svg>
"##;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    Compact,
    #[default]
    Banner,
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Solved,
    Rank,
    Class,
    MaxStreak,
}

/// Where the stat rows go. Rows are stacked vertically or laid out side by
/// side, each `w` x `h` and separated by `gap`.
#[derive(Debug, Clone, Copy)]
pub struct RowLayout {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub gap: i64,
    pub horizontal: bool,
}

/// Everything that differs between themes apart from the markup itself.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub width: i64,
    pub height: i64,
    pub radius: i64,
    pub error_height: i64,
    pub header_height: i64,
    pub dark: bool,
    pub accent: &'static str,
    pub stats: &'static [Stat],
    pub rows: RowLayout,
}

static COMPACT: Layout = Layout {
    width: 495,
    height: 130,
    radius: 18,
    error_height: 130,
    header_height: 0,
    dark: true,
    accent: "#93C5FD",
    stats: &[Stat::Solved, Stat::MaxStreak],
    rows: RowLayout {
        x: 112,
        y: 92,
        w: 150,
        h: 26,
        gap: 10,
        horizontal: true,
    },
};

static BANNER: Layout = Layout {
    width: 560,
    height: 260,
    radius: 20,
    error_height: 140,
    header_height: 72,
    dark: false,
    accent: "#818CF8",
    stats: &[Stat::Solved, Stat::Rank, Stat::Class],
    rows: RowLayout {
        x: 202,
        y: 144,
        w: 340,
        h: 28,
        gap: 8,
        horizontal: false,
    },
};

static SPLIT: Layout = Layout {
    width: 560,
    height: 300,
    radius: 18,
    error_height: 140,
    header_height: 92,
    dark: false,
    accent: "#3EF0B1",
    stats: &[Stat::Solved, Stat::Rank, Stat::Class, Stat::MaxStreak],
    rows: RowLayout {
        x: 18,
        y: 150,
        w: 524,
        h: 28,
        gap: 8,
        horizontal: false,
    },
};

impl Theme {
    /// Case-insensitive lookup, anything unknown falls back to `default`.
    pub fn parse_or(name: Option<&str>, default: Theme) -> Theme {
        name.map(str::trim)
            .and_then(|name| Theme::from_str(name).ok())
            .unwrap_or(default)
    }

    pub fn layout(&self) -> &'static Layout {
        match self {
            Theme::Compact => &COMPACT,
            Theme::Banner => &BANNER,
            Theme::Split => &SPLIT,
        }
    }

    fn template(&self) -> CardTemplate {
        match self {
            Theme::Compact => CardTemplate::Compact,
            Theme::Banner => CardTemplate::Banner,
            Theme::Split => CardTemplate::Split,
        }
    }
}

impl Stat {
    fn label(&self) -> &'static str {
        match self {
            Stat::Solved => "Solved",
            Stat::Rank => "Rank",
            Stat::Class => "Class",
            Stat::MaxStreak => "Max streak",
        }
    }

    // Absent and zero are rendered the same way.
    fn value(&self, user: &UserRecord) -> String {
        match self {
            Stat::Solved => group_thousands(user.solved_count.unwrap_or_default()),
            Stat::Rank => match user.rank.unwrap_or_default() {
                0 => "-".to_string(),
                rank => format!("#{}", group_thousands(rank)),
            },
            Stat::Class => user.class_label().unwrap_or_else(|| "-".to_string()),
            Stat::MaxStreak => group_thousands(user.max_streak.unwrap_or_default()),
        }
    }
}

/// Inputs of a single render. Image fields hold a `data:` URI, or an empty
/// string when the element should be left out.
#[derive(Debug, Clone, Default)]
pub struct CardRenderInput {
    pub user: UserRecord,
    pub tier_data_uri: String,
    pub avatar_data_uri: String,
    pub bg_data_uri: String,
    pub badge_data_uri: String,
    pub class_data_uri: String,
    pub accent_color: Option<String>,
}

/// Normalizes a user supplied colour to `#RRGGBB`, rejecting anything else.
pub fn parse_accent(input: &str) -> Option<String> {
    REGEX_HEX_COLOR
        .captures(input.trim())
        .map(|caps| format!("#{}", caps[1].to_uppercase()))
}

// Text is escaped once here and handed to the template as already safe.
fn xml(text: &str) -> Value {
    Value::from_safe_string(escape_xml(text))
}

fn rows(input: &CardRenderInput, layout: &Layout) -> Vec<Value> {
    let RowLayout {
        x,
        y,
        w,
        h,
        gap,
        horizontal,
    } = layout.rows;

    layout
        .stats
        .iter()
        .enumerate()
        .map(|(idx, stat)| {
            let offset = idx as i64;
            let (row_x, row_y) = match horizontal {
                true => (x + offset * (w + gap), y),
                false => (x, y + offset * (h + gap)),
            };
            let icon = match stat {
                Stat::Class => input.class_data_uri.as_str(),
                _ => "",
            };
            context! {
                x => row_x,
                y => row_y,
                w => w,
                h => h,
                label => xml(stat.label()),
                value => xml(&stat.value(&input.user)),
                icon => xml(icon),
            }
        })
        .collect()
}

pub fn render_card(input: &CardRenderInput, theme: Theme) -> CardResult<String> {
    let layout = theme.layout();
    let accent = input
        .accent_color
        .as_deref()
        .and_then(parse_accent)
        .unwrap_or_else(|| layout.accent.to_string());

    let rendered = theme.template().get()?.render(context! {
        w => layout.width,
        h => layout.height,
        r => layout.radius,
        header_h => layout.header_height,
        content_top => layout.header_height + 66,
        tri_x => (layout.width as f64 * 0.36).round() as i64,
        accent => xml(&accent),
        handle => xml(&input.user.handle),
        tier => input.user.tier,
        tier_name => xml(&input.user.tier_name()),
        tier_uri => xml(&input.tier_data_uri),
        avatar_uri => xml(&input.avatar_data_uri),
        bg_uri => xml(&input.bg_data_uri),
        badge_uri => xml(&input.badge_data_uri),
        class_uri => xml(&input.class_data_uri),
        rows => rows(input, layout),
    })?;
    Ok(rendered)
}

pub fn render_error_card(message: &str, theme: Theme) -> CardResult<String> {
    let layout = theme.layout();
    let rendered = CardTemplate::Error.get()?.render(context! {
        w => layout.width,
        h => layout.error_height,
        r => layout.radius,
        dark => layout.dark,
        message => xml(message),
    })?;
    Ok(rendered)
}
