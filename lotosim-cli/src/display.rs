use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use textplots::Plot;

use lotosim_core::result::{odd_even, spread};
use lotosim_core::{FrequencyTable, GameConfig, SimulationResult};

fn fmt_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn pool_label(pool: &lotosim_core::PoolConfig) -> String {
    format!("{} parmi {}-{}", pool.count, pool.min(), pool.max())
}

pub fn display_games(presets: &[(&str, GameConfig)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Clé", "Jeu", "Numéros principaux", "Numéros spéciaux"]);

    for (key, config) in presets {
        let special = config
            .special
            .as_ref()
            .map(pool_label)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            key.to_string(),
            config.name.clone(),
            pool_label(&config.main),
            special,
        ]);
    }
    println!("{table}");
}

pub fn display_result(config: &GameConfig, result: &SimulationResult, top: usize) {
    println!(
        "\n🎲 Recommandation {} ({} essais, {} ms)\n",
        config.name, result.total_trials, result.time_taken_ms
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Urne", "Numéros", "Impairs/Pairs", "Écart"]);

    let (odd, even) = odd_even(&result.recommended);
    table.add_row(vec![
        Cell::new("Principale"),
        Cell::new(fmt_numbers(&result.recommended)).fg(Color::Red),
        Cell::new(format!("{odd}/{even}")),
        Cell::new(spread(&result.recommended).to_string()),
    ]);
    if let Some(special) = &result.recommended_special {
        let (odd, even) = odd_even(special);
        table.add_row(vec![
            Cell::new("Spéciale"),
            Cell::new(fmt_numbers(special)).fg(Color::Blue),
            Cell::new(format!("{odd}/{even}")),
            Cell::new(spread(special).to_string()),
        ]);
    }
    println!("{table}");

    println!("\n── Fréquences principales (top {top}) ──");
    display_freq_table(&result.frequencies, &result.recommended, result.total_trials, top);

    if let Some(special) = &result.recommended_special {
        println!("\n── Fréquences spéciales (top {top}) ──");
        display_freq_table(&result.special_frequencies, special, result.total_trials, top);
    }
}

fn display_freq_table(freq: &FrequencyTable, recommended: &[u32], total_trials: u64, top: usize) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Fréquence", "Taux"]);

    for (number, count) in freq.ranked().into_iter().take(top) {
        let rate = count as f64 / total_trials.max(1) as f64 * 100.0;
        let color = if recommended.contains(&number) {
            Color::Green
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", number)).fg(color),
            Cell::new(count.to_string()),
            Cell::new(format!("{:.2} %", rate)),
        ]);
    }
    println!("{table}");
}

/// Histogramme ASCII des fréquences de l'urne principale.
pub fn display_frequency_chart(freq: &FrequencyTable, recommended: &[u32]) {
    if freq.is_empty() {
        return;
    }

    let points: Vec<(f32, f32)> = freq.iter().map(|(n, c)| (n as f32, c as f32)).collect();
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0) - 1.0;
    let x_max = points.last().map(|p| p.0).unwrap_or(0.0) + 1.0;
    let y_max = points.iter().map(|p| p.1).fold(0.0f32, f32::max);
    let y_min = points.iter().map(|p| p.1).fold(y_max, f32::min) * 0.95;

    println!("\n── Répartition des fréquences ──");
    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, x_min, x_max, y_min, y_max.max(1.0));
    println!("{}", chart.lineplot(&shape));
    println!("Recommandés : {}", fmt_numbers(recommended));
}

pub fn display_draws(config: &GameConfig, draws: &[(Vec<u32>, Option<Vec<u32>>)]) {
    println!("\n🎰 Tirages pondérés ({})\n", config.name);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if config.special.is_some() {
        table.set_header(vec!["#", "Principaux", "Spéciaux"]);
    } else {
        table.set_header(vec!["#", "Principaux"]);
    }

    for (i, (main, special)) in draws.iter().enumerate() {
        let mut row = vec![format!("{}", i + 1), fmt_numbers(main)];
        if let Some(s) = special {
            row.push(fmt_numbers(s));
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_report(text: &str) {
    println!("\n📝 Rapport d'analyse\n");
    println!("{text}");
}
