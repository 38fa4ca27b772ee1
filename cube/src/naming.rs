//! Identifier construction for cube resources.
//!
//! Every IRI the build emits comes from a [`Naming`] implementation. The
//! functions must be pure: the same arguments always produce the same IRI, so
//! partitioned runs can be regenerated and merged without duplicates.

/// Kind of a data structure component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// A `qb:DimensionProperty`.
    Dimension,
    /// A `qb:MeasureProperty`.
    Measure,
}

/// Level of a geographic unit in the official geographic code (COG).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeoLevel {
    /// Municipality (commune).
    Commune,
    /// Municipal arrondissement of Paris, Lyon or Marseille.
    ArrondissementMunicipal,
    /// Department.
    Departement,
}

/// IRI scheme and geographic lookups consumed by the cube build.
pub trait Naming {
    /// IRI of the data set with identifier `id`.
    fn dataset_uri(&self, id: &str) -> String;

    /// IRI of the data structure definition with identifier `id`.
    fn dsd_uri(&self, id: &str) -> String;

    /// IRI of a dimension or measure property.
    fn component_uri(&self, kind: ComponentKind, code: &str) -> String;

    /// IRI of the code `code` in the code list of concept `concept`.
    fn code_item_uri(&self, concept: &str, code: &str) -> String;

    /// IRI of a geographic unit.
    fn geographic_unit_uri(&self, level: GeoLevel, code: &str) -> String;

    /// IRI of the geographic dimension property.
    fn geographic_dimension_uri(&self) -> String;

    /// IRI of the observation for `geo_code` and the ordered dimension codes.
    fn observation_uri(&self, geo_code: &str, codes: &[String]) -> String;

    /// Department containing `geo_code`, or `None` if the code is not mapped.
    fn department_of(&self, geo_code: &str) -> Option<String>;

    /// Namespace prefixes worth declaring in serialized output.
    fn prefixes(&self) -> Vec<(String, String)>;
}

/// The INSEE linked-data IRI scheme.
#[derive(Debug, Clone)]
pub struct InseeNaming {
    base: String,
    geo_year: String,
}

impl InseeNaming {
    /// Creates the scheme rooted at `http://id.insee.fr`, with geographic
    /// units taken from the COG of `geo_year`.
    pub fn new(geo_year: impl Into<String>) -> Self {
        Self::with_base("http://id.insee.fr", geo_year)
    }

    /// Creates the scheme rooted at `base` (no trailing slash).
    pub fn with_base(base: impl Into<String>, geo_year: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_owned(),
            geo_year: geo_year.into(),
        }
    }

    fn cog_base(&self) -> String {
        format!("{}/codes/cog{}/", self.base, self.geo_year)
    }

    fn pop5_base(&self) -> String {
        format!("{}/meta/demo/pop5/", self.base)
    }
}

impl Naming for InseeNaming {
    fn dataset_uri(&self, id: &str) -> String {
        format!("{}dataSet/{}", self.pop5_base(), segment(id))
    }

    fn dsd_uri(&self, id: &str) -> String {
        format!("{}dataStructureDefinition/{}", self.pop5_base(), segment(id))
    }

    fn component_uri(&self, kind: ComponentKind, code: &str) -> String {
        let family = match kind {
            ComponentKind::Dimension => "dimension",
            ComponentKind::Measure => "mesure",
        };
        format!("{}/meta/{}/{}", self.base, family, segment(code))
    }

    fn code_item_uri(&self, concept: &str, code: &str) -> String {
        format!(
            "{}/codes/{}/{}",
            self.base,
            segment(&concept.to_lowercase()),
            segment(code)
        )
    }

    fn geographic_unit_uri(&self, level: GeoLevel, code: &str) -> String {
        let level = match level {
            GeoLevel::Commune => "commune",
            GeoLevel::ArrondissementMunicipal => "arrondissementMunicipal",
            GeoLevel::Departement => "departement",
        };
        format!("{}{}/{}", self.cog_base(), level, segment(code))
    }

    fn geographic_dimension_uri(&self) -> String {
        format!(
            "{}/meta/cog{}/dimension/DepartementCommuneArrondissementMunicipal",
            self.base, self.geo_year
        )
    }

    fn observation_uri(&self, geo_code: &str, codes: &[String]) -> String {
        let mut uri = format!("{}observation/{}", self.pop5_base(), segment(geo_code));
        for code in codes {
            uri.push('-');
            uri.push_str(&segment(code));
        }
        uri
    }

    fn department_of(&self, geo_code: &str) -> Option<String> {
        department_of(geo_code)
    }

    fn prefixes(&self) -> Vec<(String, String)> {
        let cog = format!("cog{}", self.geo_year);
        vec![
            (cog.clone(), self.cog_base()),
            (format!("{cog}-com"), format!("{}commune/", self.cog_base())),
            (
                format!("{cog}-arm"),
                format!("{}arrondissementMunicipal/", self.cog_base()),
            ),
            (
                format!("{cog}-dep"),
                format!("{}departement/", self.cog_base()),
            ),
            ("pop5-ds".into(), format!("{}dataSet/", self.pop5_base())),
            ("pop5-obs".into(), format!("{}observation/", self.pop5_base())),
            (
                format!("{cog}-dim"),
                format!("{}/meta/cog{}/dimension/", self.base, self.geo_year),
            ),
            ("dim".into(), format!("{}/meta/dimension/", self.base)),
            ("mes".into(), format!("{}/meta/mesure/", self.base)),
            ("cod-age".into(), format!("{}/codes/ageq65/", self.base)),
            ("cod-sex".into(), format!("{}/codes/sexe/", self.base)),
            ("cod-act".into(), format!("{}/codes/tactr/", self.base)),
        ]
    }
}

/// Department of a five-character COG municipality or arrondissement code.
///
/// Overseas codes (`97xxx`, `98xxx`) belong to a three-character department,
/// Corsican codes to `2A` or `2B`, everything else to its first two digits.
#[must_use]
pub fn department_of(geo_code: &str) -> Option<String> {
    let code = geo_code.trim();
    if code.len() != 5 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let head = &code[..2];
    match head {
        "97" | "98" => Some(code[..3].to_owned()),
        "2A" | "2B" => Some(head.to_owned()),
        _ if head.chars().all(|c| c.is_ascii_digit()) && head != "00" => Some(head.to_owned()),
        _ => None,
    }
}

/// Percent-encodes everything outside `[A-Za-z0-9_.~]` so that a code can be
/// used as one IRI path segment and joined with `-` without ambiguity.
fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departments_follow_cog_rules() {
        assert_eq!(department_of("01001").as_deref(), Some("01"));
        assert_eq!(department_of("75056").as_deref(), Some("75"));
        assert_eq!(department_of("75101").as_deref(), Some("75"));
        assert_eq!(department_of("2A004").as_deref(), Some("2A"));
        assert_eq!(department_of("97101").as_deref(), Some("971"));
        assert_eq!(department_of("7505"), None);
        assert_eq!(department_of("00123"), None);
        assert_eq!(department_of("ZZ123"), None);
    }

    #[test]
    fn observation_uri_is_deterministic() {
        let naming = InseeNaming::new("2017");
        let codes = vec!["1".to_owned(), "Y".to_owned()];
        assert_eq!(
            naming.observation_uri("01001", &codes),
            naming.observation_uri("01001", &codes)
        );
        assert_eq!(
            naming.observation_uri("01001", &codes),
            "http://id.insee.fr/meta/demo/pop5/observation/01001-1-Y"
        );
    }

    #[test]
    fn hyphenated_codes_cannot_collide() {
        let naming = InseeNaming::new("2017");
        let a = naming.observation_uri("01001", &["1-2".to_owned(), "3".to_owned()]);
        let b = naming.observation_uri("01001", &["1".to_owned(), "2-3".to_owned()]);
        assert_ne!(a, b);
    }

    #[test]
    fn code_items_use_lower_case_concepts() {
        let naming = InseeNaming::new("2017");
        assert_eq!(
            naming.code_item_uri("SEXE", "1"),
            "http://id.insee.fr/codes/sexe/1"
        );
        assert_eq!(
            naming.geographic_unit_uri(GeoLevel::Commune, "01001"),
            "http://id.insee.fr/codes/cog2017/commune/01001"
        );
    }
}
