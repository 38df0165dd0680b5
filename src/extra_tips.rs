//! Additional-Recommendations Matcher
//!
//! Free-text details from the household ("my heating is old...") are scanned
//! for keyword categories; each category found adds one tip to a fixed base
//! list.

/// Base tips returned for any input
const BASE_TIPS: &[&str] = &[
    "Revisa y mejora el aislamiento de puertas y ventanas",
    "Usa regletas con interruptor para cortar el consumo en espera",
    "Lava la ropa con agua fría y a carga completa",
    "Mantén limpios los filtros y rejillas de tus equipos",
    "Compara tarifas y contrata la que mejor se ajuste a tu horario de consumo",
];

/// Keyword category: any of `keywords` matching adds `tip` once.
struct KeywordCategory {
    keywords: &'static [&'static str],
    tip: &'static str,
}

/// Declaration order is output order
const CATEGORIES: &[KeywordCategory] = &[
    // heating
    KeywordCategory {
        keywords: &["calefacción", "calefaccion"],
        tip: "Baja un grado la calefacción: cada grado menos ahorra alrededor de un 7% de energía",
    },
    // lighting
    KeywordCategory {
        keywords: &["iluminación", "iluminacion"],
        tip: "Sustituye la iluminación halógena por LED y usa sensores de presencia en pasillos",
    },
    // appliances
    KeywordCategory {
        keywords: &["electrodomésticos", "electrodomesticos"],
        tip: "Elige electrodomésticos de clase energética A y úsalos a plena carga",
    },
    // computing equipment
    KeywordCategory {
        keywords: &["computadora", "ordenador"],
        tip: "Activa el modo de ahorro de energía de tu computadora y apágala por la noche",
    },
    // air conditioning
    KeywordCategory {
        keywords: &["aire acondicionado"],
        tip: "Ajusta el aire acondicionado a 24-26 °C y cierra persianas en las horas de más sol",
    },
    // lights
    KeywordCategory {
        keywords: &["luces"],
        tip: "Instala temporizadores o detectores para que las luces no queden encendidas",
    },
];

/// Stateless matcher over the static keyword table
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraTipsMatcher;

impl ExtraTipsMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Base tips plus one tip per matched category. Never fails.
    pub fn extra_tips(&self, details: &str) -> Vec<String> {
        let details = details.to_lowercase();

        let matched = CATEGORIES
            .iter()
            .filter(|category| category.keywords.iter().any(|kw| details.contains(*kw)))
            .map(|category| category.tip);

        BASE_TIPS
            .iter()
            .copied()
            .chain(matched)
            .map(str::to_string)
            .collect()
    }
}
