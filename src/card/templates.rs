use minijinja::{AutoEscape, Environment, Template};
use once_cell::sync::Lazy;
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

use crate::error::CardResult;

pub const FONT: &str = "ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto";

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();
    // Templates are SVG, which the default callback does not know about.
    env.set_auto_escape_callback(|_name| AutoEscape::Html);
    env.add_global("font", FONT);

    // Use strum to iterate over the variants of the enum.
    for template in CardTemplate::iter() {
        if let Err(e) = env.add_template(template.name(), template.template()) {
            tracing::error!("Could not load template {}: {e}", template.name());
        }
    }

    info!("Templates loaded in templating engine environment.");
    env
});

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum CardTemplate {
    Layout,
    Macros,
    Compact,
    Banner,
    Split,
    Error,
}

impl CardTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            CardTemplate::Layout => "layout.svg",
            CardTemplate::Macros => "macros.svg",
            CardTemplate::Compact => "compact.svg",
            CardTemplate::Banner => "banner.svg",
            CardTemplate::Split => "split.svg",
            CardTemplate::Error => "error.svg",
        }
    }

    pub fn get(&self) -> CardResult<Template<'static, 'static>> {
        Ok(TEMPLATES_ENVIRONMENT.get_template(self.name())?)
    }

    pub fn template(&self) -> &'static str {
        match self {
            CardTemplate::Layout => {
                r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{{ w }}" height="{{ h }}" viewBox="0 0 {{ w }} {{ h }}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <clipPath id="clipCard">
      <rect x="0" y="0" width="{{ w }}" height="{{ h }}" rx="{{ r }}"/>
    </clipPath>
    <filter id="shadow" x="-25%" y="-25%" width="160%" height="160%">
      <feDropShadow dx="0" dy="10" stdDeviation="14" flood-color="#0F172A" flood-opacity="0.10"/>
    </filter>
    <filter id="avatarShadow" x="-25%" y="-25%" width="160%" height="160%">
      <feDropShadow dx="0" dy="6" stdDeviation="10" flood-color="#0F172A" flood-opacity="0.14"/>
    </filter>
    {%- block defs %}{% endblock %}
  </defs>
  {%- block body %}{% endblock %}
</svg>
"##
            }
            CardTemplate::Macros => {
                r##"{% macro avatar(cx, cy, radius, uri, ring="#FFFFFF") -%}
  <g filter="url(#avatarShadow)">
    <circle cx="{{ cx }}" cy="{{ cy }}" r="{{ radius + 3 }}" fill="{{ ring }}"/>
    <circle cx="{{ cx }}" cy="{{ cy }}" r="{{ radius + 2 }}" fill="none" stroke="#E5E7EB"/>
    {%- if uri %}
    <image href="{{ uri }}" x="{{ cx - radius }}" y="{{ cy - radius }}" width="{{ radius * 2 }}" height="{{ radius * 2 }}" clip-path="url(#clipAvatar)" preserveAspectRatio="xMidYMid slice"/>
    {%- else %}
    <text x="{{ cx }}" y="{{ cy + 6 }}" text-anchor="middle" fill="#94A3B8" font-size="18" font-weight="900" font-family="{{ font }}">?</text>
    {%- endif %}
  </g>
{%- endmacro %}

{% macro stat_row(row) -%}
  <g>
    <rect x="{{ row.x }}" y="{{ row.y }}" width="{{ row.w }}" height="{{ row.h }}" rx="12" fill="#F8FAFC"/>
    <line x1="{{ row.x + 12 }}" y1="{{ row.y + row.h - 0.5 }}" x2="{{ row.x + row.w - 12 }}" y2="{{ row.y + row.h - 0.5 }}" stroke="#E2E8F0"/>
    <text x="{{ row.x + 12 }}" y="{{ row.y + row.h // 2 + 5 }}" fill="#64748B" font-size="12" font-weight="700" font-family="{{ font }}">{{ row.label }}</text>
    {%- if row.icon %}
    <image href="{{ row.icon }}" x="{{ row.x + row.w - 78 }}" y="{{ row.y + (row.h - 16) // 2 }}" width="16" height="16"/>
    {%- endif %}
    <text x="{{ row.x + row.w - 12 }}" y="{{ row.y + row.h // 2 + 5 }}" text-anchor="end" fill="#0F172A" font-size="12.5" font-weight="900" font-family="{{ font }}">{{ row.value }}</text>
  </g>
{%- endmacro %}

{% macro pill(row) -%}
  <g>
    <rect x="{{ row.x }}" y="{{ row.y }}" width="{{ row.w }}" height="{{ row.h }}" rx="{{ row.h // 2 }}" fill="#0F172A" stroke="#334155" opacity="0.95"/>
    <text x="{{ row.x + 15 }}" y="{{ row.y + row.h // 2 + 5 }}" fill="#CBD5E1" font-size="13" font-family="{{ font }}">{{ row.label }}</text>
    <text x="{{ row.x + row.w - 15 }}" y="{{ row.y + row.h // 2 + 5 }}" text-anchor="end" fill="#E5E7EB" font-size="13" font-weight="700" font-family="{{ font }}">{{ row.value }}</text>
  </g>
{%- endmacro %}"##
            }
            CardTemplate::Compact => {
                r##"{% extends "layout.svg" %}
{% block defs %}
    <linearGradient id="base" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#0b1220"/>
      <stop offset="100%" stop-color="#111827"/>
    </linearGradient>
    <clipPath id="clipAvatar">
      <circle cx="{{ w - 48 }}" cy="40" r="22"/>
    </clipPath>
{%- endblock %}
{% block body %}
{%- import "macros.svg" as m %}
  <g clip-path="url(#clipCard)">
    <rect width="{{ w }}" height="{{ h }}" rx="{{ r }}" fill="url(#base)"/>
    {%- if bg_uri %}
    <image href="{{ bg_uri }}" x="0" y="0" width="{{ w }}" height="{{ h }}" preserveAspectRatio="xMidYMid slice" opacity="0.18"/>
    {%- endif %}
  </g>
  <rect x="0.5" y="0.5" width="{{ w - 1 }}" height="{{ h - 1 }}" rx="{{ r - 0.5 }}" fill="none" stroke="#334155" opacity="0.65"/>

  <image href="{{ tier_uri }}" x="22" y="28" width="74" height="74"/>

  <text x="112" y="54" fill="#E5E7EB" font-size="22" font-family="{{ font }}">{{ handle }}</text>
  <text x="112" y="79" fill="{{ accent }}" font-size="14" font-weight="600" font-family="{{ font }}">{{ tier_name }}</text>
  {%- if class_uri %}
  <image href="{{ class_uri }}" x="{{ w - 136 }}" y="64" width="20" height="20"/>
  {%- endif %}
  {%- if badge_uri %}
  <image href="{{ badge_uri }}" x="{{ w - 110 }}" y="64" width="20" height="20"/>
  {%- endif %}

  {{ m.avatar(w - 48, 40, 22, avatar_uri, ring="#1F2937") }}

  <g>
  {%- for row in rows %}
  {{ m.pill(row) }}
  {%- endfor %}
  </g>
{%- endblock %}"##
            }
            CardTemplate::Banner => {
                r##"{% extends "layout.svg" %}
{% block defs %}
    <clipPath id="clipAvatar">
      <circle cx="{{ w // 2 }}" cy="{{ header_h - 6 }}" r="30"/>
    </clipPath>
    <linearGradient id="hdrFallback" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="{{ accent }}" stop-opacity="0.22"/>
      <stop offset="100%" stop-color="#F8FAFC"/>
    </linearGradient>
    <linearGradient id="hdrOverlay" x1="0" y1="0" x2="0" y2="1">
      <stop offset="0%" stop-color="#000" stop-opacity="0.04"/>
      <stop offset="100%" stop-color="#000" stop-opacity="0.08"/>
    </linearGradient>
{%- endblock %}
{% block body %}
{%- import "macros.svg" as m %}
  <g filter="url(#shadow)">
    <g clip-path="url(#clipCard)">
      <rect x="0" y="0" width="{{ w }}" height="{{ h }}" rx="{{ r }}" fill="#FFFFFF"/>
      <rect x="0" y="0" width="{{ w }}" height="{{ header_h }}" fill="url(#hdrFallback)"/>
      {%- if bg_uri %}
      <image href="{{ bg_uri }}" x="0" y="0" width="{{ w }}" height="{{ header_h }}" preserveAspectRatio="xMidYMid slice"/>
      {%- endif %}
      <rect x="0" y="0" width="{{ w }}" height="{{ header_h }}" fill="url(#hdrOverlay)"/>
      <line x1="16" y1="{{ header_h + 0.5 }}" x2="{{ w - 16 }}" y2="{{ header_h + 0.5 }}" stroke="#EEF2F7"/>
    </g>
  </g>

  {{ m.avatar(w // 2, header_h - 6, 30, avatar_uri) }}

  <text x="{{ w // 2 }}" y="{{ header_h + 34 }}" text-anchor="middle" fill="#0F172A" font-size="18" font-weight="900" font-family="{{ font }}">{{ handle }}</text>
  {%- if badge_uri %}
  <g>
    <rect x="{{ w // 2 - 78 }}" y="{{ header_h + 42 }}" width="156" height="22" rx="11" fill="#F1F5F9"/>
    <image href="{{ badge_uri }}" x="{{ w // 2 - 66 }}" y="{{ header_h + 45 }}" width="16" height="16"/>
    <text x="{{ w // 2 - 44 }}" y="{{ header_h + 57 }}" fill="#334155" font-size="11.5" font-weight="700" font-family="{{ font }}">Profile badge</text>
  </g>
  {%- endif %}

  <g>
    <rect x="18" y="{{ content_top }}" width="170" height="{{ h - content_top - 16 }}" rx="16" fill="#F8FAFC"/>
    <text x="103" y="{{ content_top + 18 }}" text-anchor="middle" fill="#64748B" font-size="11.5" font-weight="900" font-family="{{ font }}">TIER</text>
    <image href="{{ tier_uri }}" x="75" y="{{ content_top + 26 }}" width="56" height="56"/>
    <text x="103" y="{{ h - 28 }}" text-anchor="middle" fill="#0F172A" font-size="12.5" font-weight="900" font-family="{{ font }}">{{ tier_name }}</text>
  </g>

  {%- for row in rows %}
  {{ m.stat_row(row) }}
  {%- endfor %}
{%- endblock %}"##
            }
            CardTemplate::Split => {
                r##"{% extends "layout.svg" %}
{% block defs %}
    <clipPath id="clipAvatar">
      <circle cx="56" cy="46" r="31"/>
    </clipPath>
    <clipPath id="clipBgTri">
      <polygon points="{{ tri_x }},0 {{ w }},0 {{ w }},{{ header_h }}"/>
    </clipPath>
    <linearGradient id="base" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#FFFFFF"/>
      <stop offset="100%" stop-color="#F8FAFC"/>
    </linearGradient>
    <linearGradient id="triFallback" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="{{ accent }}" stop-opacity="0.20"/>
      <stop offset="100%" stop-color="#60A5FA" stop-opacity="0.18"/>
    </linearGradient>
{%- endblock %}
{% block body %}
{%- import "macros.svg" as m %}
  <g filter="url(#shadow)">
    <g clip-path="url(#clipCard)">
      <rect x="0" y="0" width="{{ w }}" height="{{ h }}" rx="{{ r }}" fill="url(#base)"/>
      <rect x="0" y="0" width="{{ w }}" height="{{ header_h }}" fill="#FFFFFF"/>
      <g clip-path="url(#clipBgTri)">
        <rect x="{{ tri_x }}" y="0" width="{{ w - tri_x }}" height="{{ header_h }}" fill="url(#triFallback)"/>
        {%- if bg_uri %}
        <image href="{{ bg_uri }}" x="{{ tri_x }}" y="0" width="{{ w - tri_x }}" height="{{ header_h }}" preserveAspectRatio="xMidYMid slice"/>
        {%- endif %}
        <rect x="{{ tri_x }}" y="0" width="{{ w - tri_x }}" height="{{ header_h }}" fill="#0F172A" opacity="0.06"/>
      </g>
      <line x1="{{ tri_x }}" y1="0" x2="{{ w }}" y2="{{ header_h }}" stroke="#E2E8F0" stroke-width="2" opacity="0.9"/>
      <line x1="18" y1="{{ header_h }}" x2="{{ w - 18 }}" y2="{{ header_h }}" stroke="#EEF2F7"/>
    </g>
  </g>

  {{ m.avatar(56, 46, 31, avatar_uri) }}

  <image href="{{ tier_uri }}" x="18" y="{{ header_h + 18 }}" width="18" height="18"/>
  <text x="44" y="{{ header_h + 34 }}" fill="#0F172A" font-size="18" font-weight="900" font-family="{{ font }}">{{ handle }}</text>
  <text x="{{ w - 18 }}" y="{{ header_h + 34 }}" text-anchor="end" fill="#64748B" font-size="12" font-weight="700" font-family="{{ font }}">{{ tier_name }}</text>
  {%- if badge_uri %}
  <image href="{{ badge_uri }}" x="{{ w - 46 }}" y="8" width="28" height="28"/>
  {%- endif %}

  {%- for row in rows %}
  {{ m.stat_row(row) }}
  {%- endfor %}
{%- endblock %}"##
            }
            CardTemplate::Error => {
                r##"{% extends "layout.svg" %}
{% block body %}
  <g filter="url(#shadow)">
    <rect width="{{ w }}" height="{{ h }}" rx="{{ r }}" fill="{{ '#111827' if dark else '#FFFFFF' }}"/>
  </g>
  <text x="22" y="54" fill="{{ '#FCA5A5' if dark else '#DC2626' }}" font-size="16" font-weight="900" font-family="{{ font }}">Error</text>
  <text x="22" y="80" fill="{{ '#E5E7EB' if dark else '#0F172A' }}" font-size="12.5" font-weight="700" font-family="{{ font }}">{{ message }}</text>
{%- endblock %}"##
            }
        }
    }
}
