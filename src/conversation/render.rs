//! Reply rendering for the guided dialogue

use crate::models::RecommendationBundle;

pub const BULLET: &str = "• ";

pub const CLOSING_MESSAGE: &str =
    "¡Gracias por usar el asistente de consumo energético! Escribe \"hola\" cuando quieras empezar de nuevo.";

/// One bullet per item, newline-joined
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", BULLET, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary and advice shown once all household figures are known
pub fn advice_reply(
    name: Option<&str>,
    consumption: f64,
    people: u32,
    bundle: &RecommendationBundle,
) -> String {
    let greeting = match name {
        Some(name) if !name.trim().is_empty() => format!("{}, este es el análisis de tu consumo:", name),
        _ => "Este es el análisis de tu consumo:".to_string(),
    };

    let summary = [
        format!("Consumo mensual: {:.2} kWh para {} personas", consumption, people),
        format!("Consumo por persona: {:.2} kWh", bundle.per_person),
        format!("Nivel de consumo: {}", bundle.level.label()),
        format!(
            "Media histórica por persona: {:.2} kWh (desviación estándar {:.2} kWh)",
            bundle.stats.mean, bundle.stats.stddev
        ),
    ];

    [
        greeting,
        bullet_list(&summary),
        "Recomendaciones generales:".to_string(),
        bullet_list(&bundle.general),
        "Recomendaciones específicas:".to_string(),
        bullet_list(&bundle.specific),
        "¿Quieres recomendaciones adicionales según los detalles de tu hogar? (sí/no)".to_string(),
    ]
    .join("\n")
}

pub fn extra_tips_reply(tips: &[String]) -> String {
    [
        "Recomendaciones adicionales:".to_string(),
        bullet_list(tips),
        CLOSING_MESSAGE.to_string(),
    ]
    .join("\n")
}
