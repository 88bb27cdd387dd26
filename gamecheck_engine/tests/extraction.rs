use gamecheck_engine::{
    extract, extract_field, Document, Error, FieldDescriptor, LookupStrategy, NormalizedValue,
    Playtime, Tier, ValueKind,
};

const MAIN: &[&str] = &["Main Story", "Single-Player", "Solo"];
const EXTRA: &[&str] = &["Main + Extras", "Main + Sides", "Story + Sides", "Main + DLC"];
const COMPLETIONIST: &[&str] = &["Completionist", "100%", "All Trophies/Achievements"];

fn load_fixture(name: &str) -> Document {
    let html = std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap();
    Document::parse(&html)
}

fn others(labels: &[&str]) -> Vec<&'static str> {
    [MAIN, EXTRA, COMPLETIONIST]
        .into_iter()
        .filter(|set| *set != labels)
        .flat_map(|set| set.iter().copied())
        .collect()
}

fn playtime_field(name: &str, labels: &[&str]) -> FieldDescriptor {
    FieldDescriptor::new(name, ValueKind::Duration)
        .strategy(
            LookupStrategy::labeled(
                r#"div[class*="GameProfile_profile_summary"], div[class*="GameStats_game_times"]"#,
                "li, div[title]",
                r#"h5, [class*="value"]"#,
                labels,
            )
            .unwrap(),
        )
        .strategy(
            LookupStrategy::block_scan(
                r#"div[class*="profile_details"] div, div[class*="game_details"] div"#,
                "span, h5, div",
                labels,
            )
            .unwrap(),
        )
        .strategy(
            LookupStrategy::adjacent_pair(r#"div[class*="GameCard_search_list_tidbit"]"#, labels, &[])
                .unwrap(),
        )
        .strategy(LookupStrategy::text_pattern(labels, &others(labels)).unwrap())
}

fn playtime_fields() -> Vec<FieldDescriptor> {
    vec![
        playtime_field("Main", MAIN),
        playtime_field("Extra", EXTRA),
        playtime_field("Completionist", COMPLETIONIST),
    ]
}

fn duration(hours: u32, minutes: u32) -> NormalizedValue {
    NormalizedValue::Duration(Playtime::new(hours, minutes))
}

#[test]
fn structured_container() {
    let doc = load_fixture("stats_container.html");
    let fields = playtime_fields();

    let hit = extract_field(&doc, &fields[0]).unwrap();
    assert_eq!(hit.tier, Tier::Structured);
    assert_eq!(hit.value, duration(27, 30));

    let extraction = extract(&doc, &fields);
    assert_eq!(extraction.get("Extra"), Some(&duration(42, 0)));
    assert_eq!(extraction.get("Completionist"), Some(&duration(63, 0)));
}

#[test]
fn structured_tier_beats_text_pattern() {
    let doc = load_fixture("stats_container.html");

    // The page text alone claims a different main-story time.
    let text_only = FieldDescriptor::new("Main", ValueKind::Duration)
        .strategy(LookupStrategy::text_pattern(MAIN, &others(MAIN)).unwrap());
    let textual = extract_field(&doc, &text_only).unwrap();
    assert_eq!(textual.value, duration(99, 0));

    let full = extract_field(&doc, &playtime_field("Main", MAIN)).unwrap();
    assert_eq!(full.value, duration(27, 30));
    assert_eq!(full.strategy, 0);
}

#[test]
fn block_scan_layout() {
    let doc = load_fixture("profile_blocks.html");
    let fields = playtime_fields();

    let hit = extract_field(&doc, &fields[0]).unwrap();
    assert_eq!(hit.tier, Tier::BlockScan);
    assert_eq!(hit.value, duration(8, 30));

    let extra = extract_field(&doc, &fields[1]).unwrap();
    assert_eq!(extra.value, duration(12, 0));
}

#[test]
fn dashes_are_unavailable_not_zero() {
    let doc = load_fixture("profile_blocks.html");
    let fields = playtime_fields();

    let err = extract_field(&doc, &fields[2]).unwrap_err();
    assert!(matches!(err, Error::UnparseableValue { ref raw, .. } if raw == "--"));

    let extraction = extract(&doc, &fields);
    assert_eq!(extraction.get("Completionist"), Some(&NormalizedValue::Unavailable));
    assert_eq!(extraction.render("Completionist").as_deref(), Some("--"));
}

#[test]
fn adjacent_pair_layout() {
    let doc = load_fixture("search_card.html");
    let fields = playtime_fields();

    let hit = extract_field(&doc, &fields[1]).unwrap();
    assert_eq!(hit.tier, Tier::AdjacentPair);
    assert_eq!(hit.value, duration(14, 30));

    let rendered = extract(&doc, &fields).to_map();
    assert_eq!(rendered["Main"], "8h");
    assert_eq!(rendered["Extra"], "14h 30m");
    assert_eq!(rendered["Completionist"], "38h");
}

#[test]
fn text_pattern_layout() {
    let doc = load_fixture("plain_text.html");
    let fields = playtime_fields();

    for field in &fields {
        let hit = extract_field(&doc, field).unwrap();
        assert_eq!(hit.tier, Tier::TextPattern, "field {}", field.name());
    }

    let extraction = extract(&doc, &fields);
    assert_eq!(extraction.get("Main"), Some(&duration(5, 0)));
    assert_eq!(extraction.get("Extra"), Some(&duration(7, 0)));
    assert_eq!(extraction.get("Completionist"), Some(&duration(11, 0)));
}

#[test]
fn no_markers_yields_all_unavailable() {
    let doc = load_fixture("no_markers.html");
    let extraction = extract(&doc, &playtime_fields());

    assert_eq!(extraction.len(), 3);
    assert!(extraction.all_unavailable());
    assert!(extraction.iter().all(|f| f.render() == "--"));
}

#[test]
fn extraction_serializes_in_request_order() {
    let doc = load_fixture("search_card.html");
    let extraction = extract(&doc, &playtime_fields());
    let json = serde_json::to_value(&extraction).unwrap();

    assert_eq!(json[0]["name"], "Main");
    assert_eq!(json[0]["kind"], "duration");
    assert_eq!(json[0]["value"]["kind"], "duration");
    assert_eq!(json[2]["name"], "Completionist");
}

#[test]
fn oversized_durations_do_not_abort_extraction() {
    let doc = Document::parse(
        "<p>Main Story 0.5 Hours 4294967295 Mins Completionist 4294967295 Hours 60 Mins</p>",
    );
    let extraction = extract(&doc, &playtime_fields());

    let main = extraction.get("Main").and_then(NormalizedValue::as_duration).unwrap();
    assert_eq!(main.hours, u32::MAX / 60);
    let completionist = extraction
        .get("Completionist")
        .and_then(NormalizedValue::as_duration)
        .unwrap();
    assert_eq!(completionist.hours, u32::MAX);
    assert_eq!(extraction.get("Extra"), Some(&NormalizedValue::Unavailable));
}
