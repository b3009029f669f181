// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn API response shapes and their normalization into [`Profile`].
//!
//! Every field is optional here: LinkedIn omits sections the member has not
//! filled in or the app lacks permission for, and text fields sometimes
//! arrive as localized objects instead of strings. Anything that is not a
//! plain string is treated as absent.

use crate::models::{Education, Experience, Profile, Website};
use serde::{Deserialize, Deserializer};

/// `GET /me`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub localized_first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub localized_last_name: Option<String>,
}

/// `GET /emailAddress?q=members&projection=(elements*(handle~))`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailResponse {
    pub elements: Vec<EmailElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailElement {
    #[serde(rename = "handle~")]
    pub handle: Option<EmailHandle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailHandle {
    #[serde(deserialize_with = "lenient_string")]
    pub email_address: Option<String>,
}

/// `GET /me?projection=(profilePicture(displayImage~:playableStreams))`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PictureResponse {
    pub profile_picture: Option<ProfilePicture>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfilePicture {
    #[serde(rename = "displayImage~")]
    pub display_image: Option<DisplayImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayImage {
    /// Renditions, smallest first.
    pub elements: Vec<PictureElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PictureElement {
    pub identifiers: Vec<PictureIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PictureIdentifier {
    #[serde(deserialize_with = "lenient_string")]
    pub identifier: Option<String>,
}

/// `GET /me?projection=(id,...,positions,educations,skills,websites)`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FullProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub headline: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub industry: Option<String>,
    pub location: Option<Location>,
    pub positions: Option<Elements<Position>>,
    pub educations: Option<Elements<EducationEntry>>,
    pub skills: Option<Elements<Skill>>,
    pub websites: Option<Elements<WebsiteEntry>>,
}

/// LinkedIn's `{ "elements": [...] }` collection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Elements<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct YearMonth {
    pub year: Option<u32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Position {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    pub start_date: Option<YearMonth>,
    pub end_date: Option<YearMonth>,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub school_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub degree_name: Option<String>,
    pub start_date: Option<YearMonth>,
    pub end_date: Option<YearMonth>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Skill {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebsiteEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

/// The four profile sub-responses, merged by [`normalize_profile`].
#[derive(Debug, Clone, Default)]
pub struct ProfileParts {
    pub basic: BasicProfile,
    pub email: EmailResponse,
    pub picture: PictureResponse,
    pub full: FullProfile,
}

/// Merge the profile sub-responses into the canonical record.
pub fn normalize_profile(parts: ProfileParts) -> Profile {
    let ProfileParts {
        basic,
        email,
        picture,
        full,
    } = parts;

    let email = email
        .elements
        .into_iter()
        .next()
        .and_then(|e| e.handle)
        .and_then(|h| h.email_address);

    // Last rendition is the largest.
    let profile_picture = picture
        .profile_picture
        .and_then(|p| p.display_image)
        .and_then(|d| d.elements.into_iter().last())
        .and_then(|e| e.identifiers.into_iter().next())
        .and_then(|i| i.identifier);

    Profile {
        id: basic.id.unwrap_or_default(),
        first_name: basic.localized_first_name.unwrap_or_default(),
        last_name: basic.localized_last_name.unwrap_or_default(),
        headline: non_empty(full.headline),
        summary: non_empty(full.summary),
        location: non_empty(full.location.and_then(|l| l.name)),
        industry: non_empty(full.industry),
        email: non_empty(email),
        profile_picture: non_empty(profile_picture),
        experiences: elements(full.positions)
            .map(|p| Experience {
                title: p.title.unwrap_or_default(),
                company: p.company_name.unwrap_or_default(),
                start_date: format_date(p.start_date),
                end_date: format_date(p.end_date),
                description: p.summary.unwrap_or_default(),
            })
            .collect(),
        education: elements(full.educations)
            .map(|e| Education {
                school: e.school_name.unwrap_or_default(),
                degree: e.degree_name.unwrap_or_default(),
                start_date: format_date(e.start_date),
                end_date: format_date(e.end_date),
            })
            .collect(),
        skills: elements(full.skills)
            .map(|s| s.name.unwrap_or_default())
            .collect(),
        websites: elements(full.websites)
            .map(|w| Website {
                name: w.name.unwrap_or_default(),
                url: w.url.unwrap_or_default(),
            })
            .collect(),
    }
}

/// `"M/YYYY"` when month and year are known, `"YYYY"` with only a year, else `""`.
pub fn format_date(date: Option<YearMonth>) -> String {
    match date {
        Some(YearMonth {
            year: Some(year),
            month: Some(month),
        }) if year != 0 && month != 0 => format!("{}/{}", month, year),
        Some(YearMonth {
            year: Some(year), ..
        }) if year != 0 => year.to_string(),
        _ => String::new(),
    }
}

fn elements<T>(collection: Option<Elements<T>>) -> impl Iterator<Item = T> {
    collection.map(|c| c.elements).unwrap_or_default().into_iter()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}
