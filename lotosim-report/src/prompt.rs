use lotosim_core::{GameConfig, SimulationResult};

fn join(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Milliers séparés par des virgules : 1000000 → "1,000,000".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Consigne envoyée au modèle de langage.
pub fn build_prompt(result: &SimulationResult, config: &GameConfig, language: &str) -> String {
    let mut rules = format!(
        "- Main Pool: {}-{} (Pick {})",
        config.main.min(),
        config.main.max(),
        config.main.count
    );
    if let Some(special) = &config.special {
        rules.push_str(&format!(
            "\n- Special Pool: {}-{} (Pick {})",
            special.min(),
            special.max(),
            special.count
        ));
    }

    let mut numbers = format!("- Recommended Main Numbers: {}", join(&result.recommended));
    if let Some(special) = &result.recommended_special {
        numbers.push_str(&format!("\n- Recommended Special Numbers: {}", join(special)));
    }

    format!(
        "You are a professional lottery analyst and statistician.\n\
         I have run {trials} Monte Carlo simulations using a Markov Chain model for the \"{name}\" lottery.\n\
         \n\
         Game Rules:\n\
         {rules}\n\
         \n\
         Simulation Results:\n\
         {numbers}\n\
         - Total Trials: {trials}\n\
         - Processing Time: {ms}ms\n\
         \n\
         Please provide:\n\
         1. A statistical interpretation of these numbers (e.g., dispersion, odd/even ratio).\n\
         2. A \"Lucky Analysis\" in a professional but encouraging tone.\n\
         3. A brief summary of why Monte Carlo/Markov methods are useful for this kind of pattern finding.\n\
         \n\
         Keep the response concise and formatted in Markdown. Use {language}.",
        trials = group_thousands(result.total_trials),
        name = config.name,
        ms = result.time_taken_ms,
    )
}
