//! Fixed canonical schema and the header → canonical column mapping.

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    fmt,
    ops::{Index, IndexMut},
};

use super::label::clean_label;

/// Numeric columns of the canonical schema (everything except `mois`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Vivants,
    NaissMois,
    MortsMois,
    MortsJuvMois,
    MortsEnfMois,
    MortsAdultMois,
    MortsTotalCum,
    MortsJuvCum,
    MortsEnfCum,
    MortsAdultCum,
}

impl Metric {
    pub const COUNT: usize = 10;

    /// Canonical column order, as used by the raw export.
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Vivants,
        Metric::NaissMois,
        Metric::MortsMois,
        Metric::MortsJuvMois,
        Metric::MortsEnfMois,
        Metric::MortsAdultMois,
        Metric::MortsTotalCum,
        Metric::MortsJuvCum,
        Metric::MortsEnfCum,
        Metric::MortsAdultCum,
    ];

    /// Metrics aggregated per month and drawn on the charts.
    pub const SUMMARY: [Metric; 6] = [
        Metric::Vivants,
        Metric::NaissMois,
        Metric::MortsMois,
        Metric::MortsJuvMois,
        Metric::MortsEnfMois,
        Metric::MortsAdultMois,
    ];

    /// A file with none of these populated carries no usable data.
    pub const REQUIRED: [Metric; 3] = [Metric::NaissMois, Metric::MortsMois, Metric::Vivants];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Vivants => "vivants",
            Metric::NaissMois => "naiss_mois",
            Metric::MortsMois => "morts_mois",
            Metric::MortsJuvMois => "morts_juv_mois",
            Metric::MortsEnfMois => "morts_enf_mois",
            Metric::MortsAdultMois => "morts_adult_mois",
            Metric::MortsTotalCum => "morts_total_cum",
            Metric::MortsJuvCum => "morts_juv_cum",
            Metric::MortsEnfCum => "morts_enf_cum",
            Metric::MortsAdultCum => "morts_adult_cum",
        }
    }

    /// Human-readable label, only meaningful for the summary metrics.
    pub fn display_label(self) -> &'static str {
        match self {
            Metric::Vivants => "Lapins vivants",
            Metric::NaissMois => "Nombre de naissance par mois",
            Metric::MortsMois => "Nombre de lapin mort en 1 mois",
            Metric::MortsJuvMois => "Décès juvéniles par mois",
            Metric::MortsEnfMois => "Décès non matures par mois",
            Metric::MortsAdultMois => "Décès matures par mois",
            Metric::MortsTotalCum => "Total de lapins morts",
            Metric::MortsJuvCum => "Lapins juvéniles morts au total",
            Metric::MortsEnfCum => "Lapins non matures morts au total",
            Metric::MortsAdultCum => "Lapins matures morts au total",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Metric::Vivants => &["lapins vivants", "lapin vivants", "nb vivants", "vivants"],
            Metric::MortsJuvCum => &[
                "nombre de lapin juveniles morts au total",
                "nb lapin juveniles morts au total",
                "lapin juveniles morts total",
            ],
            Metric::MortsEnfCum => &[
                "nombre de lapin enfant mort au total",
                "lapin enfant mort total",
                "nb enfants morts au total",
            ],
            Metric::MortsAdultCum => &[
                "nombre de lapin adulte mort au total",
                "lapin adulte mort total",
            ],
            Metric::MortsTotalCum => &["total de lapins morts", "total lapins morts"],
            Metric::NaissMois => &["nombre de naissance par mois", "naissances par mois"],
            Metric::MortsJuvMois => &[
                "nombre de lapin juveniles morts par mois",
                "lapin juveniles morts par mois",
            ],
            Metric::MortsEnfMois => &[
                "nombre de lapin enfant mort par mois",
                "lapin enfant mort par mois",
            ],
            Metric::MortsAdultMois => &[
                "nombre de lapin adulte mort par mois",
                "lapin adulte mort par mois",
            ],
            Metric::MortsMois => &[
                "nombre de lapin mort en 1 mois",
                "nombre de lapin mort par mois",
                "morts par mois",
            ],
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per metric, indexed by [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricMap<T>([T; Metric::COUNT]);

impl<T> MetricMap<T> {
    pub fn from_fn(f: impl FnMut(Metric) -> T) -> Self {
        MetricMap(Metric::ALL.map(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Metric> for MetricMap<T> {
    type Output = T;

    fn index(&self, m: Metric) -> &T {
        &self.0[m.index()]
    }
}

impl<T> IndexMut<Metric> for MetricMap<T> {
    fn index_mut(&mut self, m: Metric) -> &mut T {
        &mut self.0[m.index()]
    }
}

/// Result of mapping one raw header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderName {
    Mois,
    Metric(Metric),
    /// Unrecognized header, passed through as its cleaned label.
    Other(String),
}

impl HeaderName {
    pub fn as_str(&self) -> &str {
        match self {
            HeaderName::Mois => "mois",
            HeaderName::Metric(m) => m.name(),
            HeaderName::Other(s) => s,
        }
    }
}

/// cleaned keyword → canonical column
static KEYWORDS: Lazy<HashMap<String, HeaderName>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(clean_label("mois"), HeaderName::Mois);
    for metric in Metric::ALL {
        for kw in metric.keywords() {
            map.insert(clean_label(kw), HeaderName::Metric(metric));
        }
    }
    map
});

/// Map a raw header onto the canonical schema: exact keyword lookup,
/// then prefix/suffix heuristics, then pass-through.
pub fn map_to_canonical(header: &str) -> HeaderName {
    let cleaned = clean_label(header);
    if let Some(name) = KEYWORDS.get(&cleaned) {
        return name.clone();
    }
    if cleaned.starts_with("nombre de naissance") {
        return HeaderName::Metric(Metric::NaissMois);
    }
    if cleaned.starts_with("nombre de lapin mort en") || cleaned.ends_with("mort par mois") {
        return HeaderName::Metric(Metric::MortsMois);
    }
    HeaderName::Other(cleaned)
}
