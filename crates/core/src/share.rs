use thiserror::Error;
use url::Url;

use crate::model::{Language, QuizResult};

const SHARE_SEGMENT: &str = "share";
const SLUG_PREFIX: &str = "result-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShareLinkError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("not a share link: {0}")]
    NotAShareLink(String),

    #[error("invalid result slug: {0}")]
    InvalidSlug(String),
}

/// Identifies a shared result: which variant, in which language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareLink {
    code: u32,
    language: Language,
}

impl ShareLink {
    #[must_use]
    pub fn new(code: u32, language: Language) -> Self {
        Self { code, language }
    }

    #[must_use]
    pub fn code(&self) -> u32 {
        self.code
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn slug(&self) -> String {
        format!("{SLUG_PREFIX}{}", self.code)
    }

    /// Absolute canonical URL under `origin`, e.g. `https://host/share/result-3?lang=ENG`.
    #[must_use]
    pub fn to_url(&self, origin: &Url) -> Url {
        let mut url = origin.clone();
        let base = origin.path().trim_end_matches('/');
        url.set_path(&format!("{base}/{SHARE_SEGMENT}/{}", self.slug()));
        url.set_query(Some(&format!("lang={}", self.language.code())));
        url.set_fragment(None);
        url
    }

    /// Parse an inbound share URL or path.
    ///
    /// Anything other than `lang=ENG` resolves to Korean, matching how the
    /// landing page treats missing or unknown language parameters.
    ///
    /// # Errors
    ///
    /// Returns `ShareLinkError` if the input is not a URL, does not point at a
    /// share route, or carries a slug other than `result-<digits>`.
    pub fn parse(input: &str) -> Result<Self, ShareLinkError> {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
                .and_then(|base| base.join(input))
                .map_err(|err| ShareLinkError::InvalidUrl(err.to_string()))?,
            Err(err) => return Err(ShareLinkError::InvalidUrl(err.to_string())),
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let slug = match segments.as_slice() {
            [.., share, slug] if *share == SHARE_SEGMENT => *slug,
            _ => return Err(ShareLinkError::NotAShareLink(input.to_string())),
        };

        let code = parse_slug(slug)?;
        let language = url
            .query_pairs()
            .find(|(key, _)| key == "lang")
            .map_or(Language::Kor, |(_, value)| {
                if value == "ENG" {
                    Language::Eng
                } else {
                    Language::Kor
                }
            });

        Ok(Self { code, language })
    }
}

fn parse_slug(slug: &str) -> Result<u32, ShareLinkError> {
    slug.strip_prefix(SLUG_PREFIX)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| ShareLinkError::InvalidSlug(slug.to_string()))
}

/// What gets shared: the result image, the canonical link and a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareArtifact {
    pub image_url: String,
    pub canonical_url: String,
    pub title: String,
}

impl ShareArtifact {
    /// Build the artifact for `result` as seen in `language`.
    ///
    /// An image reference that cannot be resolved against `origin` is replaced
    /// by the artifact path derived from the result code.
    #[must_use]
    pub fn for_result(result: &QuizResult, language: Language, origin: &Url, title: &str) -> Self {
        let image_url = origin
            .join(&localized_image(&result.image_ref(), language))
            .unwrap_or_else(|_| {
                let mut url = origin.clone();
                url.set_path(&localized_image(&result.default_image_ref(), language));
                url.set_query(None);
                url.set_fragment(None);
                url
            });
        let canonical_url = ShareLink::new(result.display_code(), language).to_url(origin);

        Self {
            image_url: image_url.into(),
            canonical_url: canonical_url.into(),
            title: title.to_string(),
        }
    }

    /// File name for the image when it is attached to a native share.
    #[must_use]
    pub fn image_file_name(&self) -> String {
        self.image_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("result.png")
            .to_string()
    }
}

fn localized_image(path: &str, language: Language) -> String {
    let suffix = language.asset_suffix();
    let split = path.len().saturating_sub(4);
    match path.get(split..) {
        Some(ext) if !suffix.is_empty() && ext.eq_ignore_ascii_case(".png") => {
            format!("{}{suffix}{}", &path[..split], ext)
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://quiz.example.com").unwrap()
    }

    #[test]
    fn canonical_url_carries_slug_and_language() {
        let url = ShareLink::new(7, Language::Eng).to_url(&origin());
        assert_eq!(url.as_str(), "https://quiz.example.com/share/result-7?lang=ENG");

        let nested = Url::parse("https://host.example/app/").unwrap();
        let url = ShareLink::new(2, Language::Kor).to_url(&nested);
        assert_eq!(url.as_str(), "https://host.example/app/share/result-2?lang=KOR");
    }

    #[test]
    fn parses_paths_and_absolute_links() {
        let link = ShareLink::parse("/share/result-12?lang=ENG").unwrap();
        assert_eq!(link, ShareLink::new(12, Language::Eng));

        let link = ShareLink::parse("https://quiz.example.com/share/result-3").unwrap();
        assert_eq!(link.language(), Language::Kor);

        let link = ShareLink::parse("/share/result-3?lang=eng").unwrap();
        assert_eq!(link.language(), Language::Kor);
    }

    #[test]
    fn rejects_bad_slugs() {
        assert_eq!(
            ShareLink::parse("/share/result-"),
            Err(ShareLinkError::InvalidSlug("result-".into()))
        );
        assert!(matches!(
            ShareLink::parse("/share/result-3a"),
            Err(ShareLinkError::InvalidSlug(_))
        ));
        assert!(matches!(
            ShareLink::parse("/result/result-3"),
            Err(ShareLinkError::NotAShareLink(_))
        ));
    }

    #[test]
    fn artifact_localizes_image_for_english() {
        let result = QuizResult::new(4).with_image("/assets/result-4.PNG");
        let artifact = ShareArtifact::for_result(&result, Language::Eng, &origin(), "Spot Eraser");
        assert_eq!(artifact.image_url, "https://quiz.example.com/assets/result-4_eng.PNG");
        assert_eq!(
            artifact.canonical_url,
            "https://quiz.example.com/share/result-4?lang=ENG"
        );
        assert_eq!(artifact.image_file_name(), "result-4_eng.PNG");
    }

    #[test]
    fn artifact_for_korean_keeps_backend_image() {
        let result = QuizResult::new(6);
        let artifact = ShareArtifact::for_result(&result, Language::Kor, &origin(), "Spot Eraser");
        assert_eq!(artifact.image_url, "https://quiz.example.com/assets/result-6.png");
    }

    #[test]
    fn unusable_image_falls_back_to_the_code_path() {
        let result = QuizResult::new(3).with_image("http://[bad/result-3.png");

        let artifact = ShareArtifact::for_result(&result, Language::Eng, &origin(), "Spot Eraser");
        assert_eq!(artifact.image_url, "https://quiz.example.com/assets/result-3_eng.png");
        assert_eq!(
            artifact.canonical_url,
            "https://quiz.example.com/share/result-3?lang=ENG"
        );

        let artifact = ShareArtifact::for_result(&result, Language::Kor, &origin(), "Spot Eraser");
        assert_eq!(artifact.image_url, "https://quiz.example.com/assets/result-3.png");
    }
}
