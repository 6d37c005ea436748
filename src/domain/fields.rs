//! fbref `data-stat` identifiers and the display columns of `results.csv`.

/// Join key shared by every category table.
pub const IDENTITY_FIELD: &str = "player";
pub const MINUTES_FIELD: &str = "minutes";

/// Fields owned by the primary category. Secondary categories never
/// contribute these.
pub const CONTEXT_FIELDS: [&str; 7] = [
    "nationality",
    "position",
    "team",
    "age",
    "games",
    "games_starts",
    "minutes",
];

pub const PLAYER_COLUMN: &str = "Player";
pub const NATION_COLUMN: &str = "Nation";
pub const AGE_COLUMN: &str = "Age";
pub const MINUTES_COLUMN: &str = "Minutes";
pub const TEAM_COLUMN: &str = "Squad";
pub const POSITION_COLUMN: &str = "Position";

/// Placeholder written for every missing or blank output cell.
pub const SENTINEL: &str = "N/a";

/// Minimum minutes (exclusive) for a row to make it into `results.csv`.
pub const BASE_MINUTES_THRESHOLD: f64 = 90.0;

/// Minimum minutes (exclusive) for a player to count as a regular when
/// cross-referencing market values.
pub const REGULAR_MINUTES_THRESHOLD: f64 = 900.0;

pub static FIELD_MAP: &[(&str, &str)] = &[
    ("player", "Player"),
    ("nationality", "Nation"),
    ("team", "Squad"),
    ("position", "Position"),
    ("age", "Age"),
    ("minutes", "Minutes"),
    ("games", "Matches played"),
    ("games_starts", "Starts"),
    ("goals", "Goals"),
    ("assists", "Assists"),
    ("cards_yellow", "Yellow cards"),
    ("cards_red", "Red cards"),
    ("xg", "Expected: xG"),
    ("xg_assist", "Expected: xAG"),
    ("progressive_carries", "Progression: PrgC"),
    ("progressive_passes", "Progression: PrgP"),
    ("progressive_passes_received", "Progression: PrgR"),
    ("goals_per90", "Per 90: Gls"),
    ("assists_per90", "Per 90: Ast"),
    ("xg_per90", "Per 90: xG"),
    ("gk_xg_against_per90", "Per 90: xGA"),
    ("gk_goals_against_per90", "Performance: GA90"),
    ("gk_save_pct", "Performance: Save%"),
    ("gk_clean_sheets_pct", "Performance: CS%"),
    ("gk_pens_save_pct", "Penalty Kicks: Save%"),
    ("shots_on_target_pct", "Standard: SoT%"),
    ("shots_on_target_per90", "Standard: SoT/90"),
    ("goals_per_shot", "Standard: G/Sh"),
    ("average_shot_distance", "Standard: Dist"),
    ("passes_completed", "Total: Cmp"),
    ("passes_pct", "Total: Cmp%"),
    ("passes_progressive_distance", "Total: TotDist"),
    ("passes_pct_short", "Short: Cmp%"),
    ("passes_pct_medium", "Medium: Cmp%"),
    ("passes_pct_long", "Long: Cmp%"),
    ("assisted_shots", "Expected: KP"),
    ("passes_into_final_third", "Expected: 1/3"),
    ("passes_into_penalty_area", "Expected: PPA"),
    ("crosses_into_penalty_area", "Expected: CrsPA"),
    ("sca", "SCA"),
    ("sca_per90", "SCA90"),
    ("gca", "GCA"),
    ("gca_per90", "GCA90"),
    ("tackles", "Tackles: Tkl"),
    ("tackles_won", "Tackles: TklW"),
    ("challenges_attempted", "Challenges: Att"),
    ("challenges_lost", "Challenges: Lost"),
    ("blocks", "Blocks: Blocks"),
    ("blocked_shots", "Blocks: Sh"),
    ("blocked_passes", "Blocks: Pass"),
    ("interceptions", "Blocks: Int"),
    ("touches", "Touches: Touches"),
    ("touches_def_pen_area", "Touches: Def Pen"),
    ("touches_def_3rd", "Touches: Def 3rd"),
    ("touches_mid_3rd", "Touches: Mid 3rd"),
    ("touches_att_3rd", "Touches Att 3rd"),
    ("touches_att_pen_area", "Touches Att Pen"),
    ("take_ons_attempted", "TakeOns: Att"),
    ("take_ons_successful_pct", "TakeOns: Succ%"),
    ("take_ons_tackled_pct", "TakeOns: Tkld%"),
    ("carries", "Carries: Carries"),
    ("carries_progressive_distance", "Carries: PrgDist"),
    ("carries_into_final_third", "Carries: 1/3"),
    ("carries_into_penalty_area", "Carries: CPA"),
    ("carries_miscontrols", "Carries: Mis"),
    ("carries_dispossessed", "Carries: Dis"),
    ("passes_received", "Receiving: Rec"),
    ("fouls", "Performance: Fls"),
    ("fouled", "Performance: Fld"),
    ("offsides", "Performance: Off"),
    ("crosses", "Performance: Crs"),
    ("ball_recoveries", "Performance: Recov"),
    ("aerials_won", "Aerials: Won"),
    ("aerials_lost", "Aerials: Lost"),
    ("aerials_won_pct", "Aerials: Won%"),
];

/// Display name for an fbref field, or the field itself when unmapped.
pub fn display_name(field: &str) -> &str {
    FIELD_MAP
        .iter()
        .find(|(id, _)| *id == field)
        .map(|(_, display)| *display)
        .unwrap_or(field)
}

/// Declared column order of `results.csv`: `Player` first, then every
/// mapped display name once.
pub fn output_columns() -> Vec<String> {
    let mut columns = vec![PLAYER_COLUMN.to_string()];
    for (_, display) in FIELD_MAP {
        if !columns.iter().any(|c| c == display) {
            columns.push(display.to_string());
        }
    }
    columns
}

pub fn is_context_field(field: &str) -> bool {
    CONTEXT_FIELDS.contains(&field)
}
