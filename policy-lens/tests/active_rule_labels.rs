use policy_lens::{
    ActiveRule, GameInfoTables, LocaleTable, ModifierOutcome, PolicyEngine, RequirementSetResolver,
    StaticRules, Tables,
};
use serde_json::{Value, json};

/// R1 grants M1 (town requirement, tooltip "Bonus Gold") and M2 (coastal
/// requirement only).
fn tradition_tables() -> Value {
    json!({
        "TraditionModifiers": [
            { "TraditionType": "R1", "ModifierId": "M1" },
            { "TraditionType": "R1", "ModifierID": "M2" }
        ],
        "Modifiers": [
            {
                "ModifierId": "M1",
                "ModifierType": "MODIFIER_CITY_ADJUST_YIELD",
                "SubjectRequirementSetId": "RS_TOWN"
            },
            {
                "ModifierId": "M2",
                "ModifierType": "MODIFIER_CITY_ADJUST_YIELD",
                "SubjectRequirementSetId": "RS_COAST"
            }
        ],
        "DynamicModifiers": [
            { "ModifierType": "MODIFIER_CITY_ADJUST_YIELD", "EffectType": "EFFECT_CITY_ADJUST_YIELD" }
        ],
        "RequirementSets": [
            { "RequirementSetId": "RS_TOWN", "RequirementSetType": "REQUIREMENTSET_TEST_ALL" },
            { "RequirementSetId": "RS_COAST", "RequirementSetType": "REQUIREMENTSET_TEST_ALL" }
        ],
        "RequirementSetRequirements": [
            { "RequirementSetId": "RS_TOWN", "RequirementId": "REQ_CITY_IS_TOWN" },
            { "RequirementSetId": "RS_COAST", "RequirementId": "REQ_CITY_IS_COASTAL" }
        ],
        "Requirements": [
            { "RequirementId": "REQ_CITY_IS_TOWN", "RequirementType": "REQUIREMENT_CITY_IS_TOWN" },
            { "RequirementId": "REQ_CITY_IS_COASTAL", "RequirementType": "REQUIREMENT_CITY_IS_COASTAL" }
        ],
        "ModifierArguments": [
            { "ModifierId": "M1", "Name": "YieldType", "Value": "YIELD_GOLD" },
            { "ModifierId": "M1", "Name": "Tooltip", "Value": "LOC_BONUS_GOLD" },
            { "ModifierId": "M2", "Name": "Tooltip", "Value": "LOC_COASTAL_FOOD" }
        ]
    })
}

fn tables_from(value: Value) -> GameInfoTables {
    serde_json::from_value(value).unwrap()
}

fn locale() -> LocaleTable {
    LocaleTable::new()
        .with("LOC_BONUS_GOLD", "Bonus Gold")
        .with("LOC_COASTAL_FOOD", "Coastal Food")
        .with("LOC_A", "Alpha")
}

fn tradition_one() -> StaticRules {
    StaticRules::new(vec![
        ActiveRule::new("R1").with_localized_name("Tradition One"),
    ])
}

#[test]
fn only_allow_listed_modifiers_produce_labels() {
    let tables = tables_from(tradition_tables());
    let rules = tradition_one();
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);

    assert_eq!(
        engine.get_display_labels_for_active_rule_modifiers(),
        ["Bonus Gold"]
    );
}

#[test]
fn missing_requirement_set_table_excludes_everything() {
    let mut value = tradition_tables();
    value.as_object_mut().unwrap().remove("RequirementSets");
    let tables = tables_from(value);
    let rules = tradition_one();
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);

    assert!(engine.get_display_labels_for_active_rule_modifiers().is_empty());

    let resolved = engine.get_resolved_modifiers_for_active_rules().unwrap();
    let entry = &resolved.entries[0];
    assert_eq!(entry.modifier_ids, ["M1", "M2"]);
    assert!(entry.modifiers.iter().all(|m| {
        m.resolved()
            .is_some_and(|m| m.subject_requirement_set.is_none())
    }));
}

#[test]
fn structured_result_keeps_failed_modifiers_as_markers() {
    let mut value = tradition_tables();
    value["TraditionModifiers"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "TraditionType": "R1", "ModifierId": "M_MISSING" }));
    let tables = tables_from(value);
    let rules = StaticRules::new(vec![
        ActiveRule::new("R1").with_name_tag("LOC_A"),
        ActiveRule::default(),
    ]);
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);

    let resolved = engine.get_resolved_modifiers_for_active_rules().unwrap();
    assert_eq!(resolved.active_rule_count, 2);
    assert_eq!(resolved.entries.len(), 1);

    let entry = &resolved.entries[0];
    assert_eq!(entry.rule_id, "R1");
    assert_eq!(entry.name_tag.as_deref(), Some("LOC_A"));
    assert_eq!(entry.localized_name.as_deref(), Some("Alpha"));
    assert_eq!(entry.modifier_ids, ["M1", "M2", "M_MISSING"]);
    assert_eq!(entry.modifiers.len(), 3);
    assert_eq!(
        entry.modifiers[2],
        ModifierOutcome::Unresolved {
            error: "Modifier not found or failed to resolve".to_string(),
            id: "M_MISSING".to_string(),
        }
    );

    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["activeRuleCount"], 2);
    assert_eq!(json["entries"][0]["modifiers"][2]["id"], "M_MISSING");
    assert_eq!(
        json["entries"][0]["modifiers"][0]["subjectRequirementSet"]["setId"],
        "RS_TOWN"
    );
}

#[test]
fn label_priority_falls_from_tooltip_to_rule_to_id() {
    let tables = tables_from(tradition_tables());
    let locale = locale();

    let rules = StaticRules::new(vec![ActiveRule::new("R1").with_localized_name("Beta")]);
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);
    assert_eq!(engine.get_display_labels_for_active_rule_modifiers(), ["Bonus Gold"]);

    let mut value = tradition_tables();
    value["ModifierArguments"]
        .as_array_mut()
        .unwrap()
        .retain(|arg| arg["Name"] != "Tooltip");
    let no_tooltip = tables_from(value);
    let engine = PolicyEngine::new(&no_tooltip, &rules).with_composer(&locale);
    assert_eq!(engine.get_display_labels_for_active_rule_modifiers(), ["Beta"]);

    let nameless = StaticRules::new(vec![ActiveRule::new("R1")]);
    let engine = PolicyEngine::new(&no_tooltip, &nameless).with_composer(&locale);
    assert_eq!(engine.get_display_labels_for_active_rule_modifiers(), ["M1"]);
}

#[test]
fn adding_an_allow_listed_requirement_admits_the_modifier() {
    let tables = tables_from(tradition_tables());
    let rules = tradition_one();
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);
    assert!(
        !engine
            .get_display_labels_for_active_rule_modifiers()
            .contains(&"Coastal Food".to_string())
    );

    // RS_COAST is a TEST_ALL set, but one allow-listed requirement is enough.
    let mut value = tradition_tables();
    value["RequirementSetRequirements"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "RequirementSetId": "RS_COAST", "RequirementId": "REQ_CITY_IS_TOWN" }));
    let widened = tables_from(value);
    let engine = PolicyEngine::new(&widened, &rules).with_composer(&locale);
    assert_eq!(
        engine.get_display_labels_for_active_rule_modifiers(),
        ["Bonus Gold", "Coastal Food"]
    );
}

#[test]
fn identical_labels_are_reported_once() {
    let mut value = tradition_tables();
    value["ModifierArguments"] = json!([
        { "ModifierId": "M1", "Name": "Tooltip", "Value": "LOC_BONUS_GOLD" },
        { "ModifierId": "M2", "Name": "Tooltip", "Value": "LOC_BONUS_GOLD" }
    ]);
    value["RequirementSetRequirements"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "RequirementSetId": "RS_COAST", "RequirementId": "REQ_CITY_IS_TOWN" }));
    let tables = tables_from(value);
    // The same rule slotted twice is processed twice, then deduplicated.
    let rules = StaticRules::new(vec![ActiveRule::new("R1"), ActiveRule::new("R1")]);
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);

    let resolved = engine.get_resolved_modifiers_for_active_rules().unwrap();
    assert_eq!(resolved.entries.len(), 2);
    assert_eq!(
        engine.get_display_labels_for_active_rule_modifiers(),
        ["Bonus Gold"]
    );
}

#[test]
fn repeated_calls_are_identical() {
    let tables = tables_from(tradition_tables());
    let rules = tradition_one();
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);

    let first = engine.get_resolved_modifiers_for_active_rules().unwrap();
    let second = engine.get_resolved_modifiers_for_active_rules().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        engine.get_display_labels_for_active_rule_modifiers(),
        engine.get_display_labels_for_active_rule_modifiers()
    );
    assert_eq!(rules.refresh_count(), 4);
}

#[test]
fn missing_hosts_degrade_to_empty_results() {
    let tables = GameInfoTables::default();
    let rules = StaticRules::unavailable();
    let engine = PolicyEngine::new(&tables, &rules);

    let resolved = engine.get_resolved_modifiers_for_active_rules().unwrap();
    assert_eq!(resolved.active_rule_count, 0);
    assert!(resolved.entries.is_empty());
    assert!(engine.get_display_labels_for_active_rule_modifiers().is_empty());

    let rules = tradition_one();
    let engine = PolicyEngine::new(&tables, &rules);
    let resolved = engine.get_resolved_modifiers_for_active_rules().unwrap();
    assert_eq!(resolved.entries[0].modifier_ids, Vec::<String>::new());
}

#[test]
fn without_a_composer_raw_tooltip_tags_are_used() {
    let tables = tables_from(tradition_tables());
    let rules = tradition_one();
    let engine = PolicyEngine::new(&tables, &rules);
    assert_eq!(
        engine.get_display_labels_for_active_rule_modifiers(),
        ["LOC_BONUS_GOLD"]
    );
}

#[test]
fn unknown_requirement_sets_resolve_to_none() {
    let tables = tables_from(tradition_tables());
    let resolver = RequirementSetResolver::new(Tables::new(&tables));
    for id in ["RS_NOPE", "rs_town", "RS_TOWN "] {
        assert_eq!(resolver.resolve_requirement_set(Some(id)), None, "{id}");
    }
}

#[test]
fn null_columns_only_drop_the_affected_row() {
    let mut value = tradition_tables();
    value["RequirementSetRequirements"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "RequirementSetId": "RS_TOWN", "RequirementId": null }));
    value["Requirements"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "RequirementId": "REQ_UNTYPED", "RequirementType": null }));
    let tables = tables_from(value);
    let rules = tradition_one();
    let locale = locale();
    let engine = PolicyEngine::new(&tables, &rules).with_composer(&locale);

    assert_eq!(
        engine.get_display_labels_for_active_rule_modifiers(),
        ["Bonus Gold"]
    );
}
