use crate::error::MateError;
use crate::ids::{ComponentId, MateId};
use crate::mates::{ConflictKind, MateManager, MateParameters, MateReference, MateStatus, MateType, ParameterValue};

fn distance(d: f64) -> MateParameters {
    MateParameters::from([("distance".to_string(), ParameterValue::Number(d))])
}

fn face(component: &str, id: &str) -> MateReference {
    MateReference::face(component, id)
}

#[test]
fn test_create_and_lookup() {
    let mut manager = MateManager::new();
    let mate = manager
        .create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new())
        .unwrap();

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.get_mate(&mate.mate_id), Some(&mate));
    assert_eq!(manager.get_mates_for_component(&"a".into()).len(), 1);
    assert_eq!(manager.get_mates_for_component(&"b".into()).len(), 1);
    assert!(manager.get_mates_for_component(&"c".into()).is_empty());
}

#[test]
fn test_create_rejects_same_component_before_registering() {
    let mut manager = MateManager::new();
    let result = manager.create_mate(MateType::Parallel, face("a", "1"), face("a", "2"), MateParameters::new());
    assert!(matches!(result, Err(MateError::SameComponent(_))));
    assert!(manager.is_empty());
    assert!(manager.get_mates_for_component(&"a".into()).is_empty());
}

#[test]
fn test_create_rejects_missing_parameters() {
    let mut manager = MateManager::new();
    assert!(manager.create_mate(MateType::Distance, face("a", "1"), face("b", "1"), MateParameters::new()).is_err());
    assert!(manager.create_mate(MateType::Angle, face("a", "1"), face("b", "1"), distance(1.0)).is_err());
    assert!(manager.is_empty());
}

#[test]
fn test_component_lookup_preserves_insertion_order() {
    let mut manager = MateManager::new();
    let m1 = manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    let m2 = manager.create_mate(MateType::Parallel, face("c", "1"), face("a", "2"), MateParameters::new()).unwrap();
    let m3 = manager.create_mate(MateType::Distance, face("a", "3"), face("d", "1"), distance(2.0)).unwrap();

    let ids: Vec<&MateId> = manager.get_mates_for_component(&"a".into()).into_iter().map(|m| &m.mate_id).collect();
    assert_eq!(ids, vec![&m1.mate_id, &m2.mate_id, &m3.mate_id]);
}

#[test]
fn test_delete_removes_index_entries() {
    let mut manager = MateManager::new();
    let m1 = manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    let m2 = manager.create_mate(MateType::Parallel, face("a", "2"), face("c", "1"), MateParameters::new()).unwrap();

    assert!(manager.delete_mate(&m1.mate_id));
    assert!(!manager.delete_mate(&m1.mate_id));
    assert!(manager.get_mate(&m1.mate_id).is_none());
    assert!(manager.get_mates_for_component(&"b".into()).is_empty());

    let remaining: Vec<_> = manager.get_mates_for_component(&"a".into()).into_iter().map(|m| m.mate_id.clone()).collect();
    assert_eq!(remaining, vec![m2.mate_id]);
}

#[test]
fn test_delete_mates_for_component() {
    let mut manager = MateManager::new();
    manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    manager.create_mate(MateType::Parallel, face("b", "2"), face("c", "1"), MateParameters::new()).unwrap();
    let keep = manager.create_mate(MateType::Parallel, face("a", "2"), face("c", "2"), MateParameters::new()).unwrap();

    let removed = manager.delete_mates_for_component(&"b".into());
    assert_eq!(removed.len(), 2);
    assert_eq!(manager.len(), 1);
    assert!(manager.get_mate(&keep.mate_id).is_some());
}

#[test]
fn test_insert_duplicate_id_rejected() {
    let mut manager = MateManager::new();
    let mate = manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    assert!(matches!(manager.insert_mate(mate), Err(MateError::DuplicateMate(_))));
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_update_parameters_validates() {
    let mut manager = MateManager::new();
    let mate = manager.create_mate(MateType::Distance, face("a", "1"), face("b", "1"), distance(1.0)).unwrap();

    assert!(manager.update_parameters(&mate.mate_id, MateParameters::new()).is_err());
    assert_eq!(manager.get_mate(&mate.mate_id).unwrap().parameters, distance(1.0));

    manager.update_parameters(&mate.mate_id, distance(3.0)).unwrap();
    assert_eq!(manager.get_mate(&mate.mate_id).unwrap().parameters, distance(3.0));

    let mut with_nan = distance(2.0);
    with_nan.insert("offset".to_string(), ParameterValue::Number(f64::NAN));
    assert!(matches!(
        manager.update_parameters(&mate.mate_id, with_nan),
        Err(MateError::NonNumericParameter { .. })
    ));
    assert_eq!(manager.get_mate(&mate.mate_id).unwrap().parameters, distance(3.0));

    assert!(matches!(
        manager.update_parameters(&MateId::from("nope"), distance(1.0)),
        Err(MateError::MateNotFound(_))
    ));
}

#[test]
fn test_validate_mate_sets_status() {
    let mut manager = MateManager::new();
    let mut mate = manager.create_mate(MateType::Angle, face("a", "1"), face("b", "1"),
        MateParameters::from([("angle".to_string(), ParameterValue::Number(45.0))])).unwrap();

    assert!(MateManager::validate_mate(&mut mate));
    assert_eq!(mate.status, MateStatus::Ok);

    mate.parameters.clear();
    assert!(!MateManager::validate_mate(&mut mate));
    assert_eq!(mate.status, MateStatus::Error);

    mate.parameters.insert("angle".into(), ParameterValue::Number(10.0));
    mate.reference2.component_id = ComponentId::from("a");
    assert!(!MateManager::validate_mate(&mut mate));
    assert_eq!(mate.status, MateStatus::Error);
}

#[test]
fn test_incompatible_pairs_reported_once() {
    let mut manager = MateManager::new();
    let c = manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    let d = manager.create_mate(MateType::Distance, face("b", "2"), face("a", "2"), distance(5.0)).unwrap();
    let p = manager.create_mate(MateType::Parallel, face("a", "3"), face("b", "3"), MateParameters::new()).unwrap();
    let q = manager.create_mate(MateType::Perpendicular, face("a", "4"), face("b", "4"), MateParameters::new()).unwrap();
    // Same types on a different pair do not clash with the a/b mates.
    manager.create_mate(MateType::Perpendicular, face("a", "5"), face("c", "1"), MateParameters::new()).unwrap();

    let conflicts = manager.get_mate_conflicts();
    assert_eq!(conflicts.len(), 2);
    assert!(conflicts.iter().all(|c| c.conflict_type == ConflictKind::Incompatible));
    assert_eq!(conflicts[0].mate_ids, vec![c.mate_id, d.mate_id]);
    assert_eq!(conflicts[1].mate_ids, vec![p.mate_id, q.mate_id]);
}

#[test]
fn test_compatible_mates_have_no_conflicts() {
    let mut manager = MateManager::new();
    manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    manager.create_mate(MateType::Parallel, face("a", "2"), face("b", "2"), MateParameters::new()).unwrap();
    manager.create_mate(MateType::Align, face("a", "3"), face("b", "3"), MateParameters::new()).unwrap();
    assert!(manager.get_mate_conflicts().is_empty());
}

#[test]
fn test_overconstraint_is_advisory() {
    let mut manager = MateManager::new();
    for i in 0..7 {
        let other = format!("c{}", i);
        manager
            .create_mate(MateType::Parallel, face("hub", &i.to_string()), face(&other, "1"), MateParameters::new())
            .unwrap();
    }
    assert_eq!(manager.len(), 7);
    assert_eq!(manager.overconstrained_components(), vec![(ComponentId::from("hub"), 7)]);
    assert!(manager.get_mate_conflicts().is_empty());
}

#[test]
fn test_refresh_statuses() {
    let mut manager = MateManager::new();
    let c = manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    let d = manager.create_mate(MateType::Distance, face("a", "2"), face("b", "2"), distance(5.0)).unwrap();
    let fine = manager.create_mate(MateType::Parallel, face("b", "3"), face("c", "1"), MateParameters::new()).unwrap();
    for i in 0..7 {
        manager
            .create_mate(MateType::Parallel, face("hub", &i.to_string()), face(&format!("s{}", i), "1"), MateParameters::new())
            .unwrap();
    }

    let conflicts = manager.refresh_statuses();
    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[1].conflict_type, ConflictKind::Overconstrained);
    assert_eq!(conflicts[1].mate_ids.len(), 7);

    assert_eq!(manager.get_mate(&c.mate_id).unwrap().status, MateStatus::Conflict);
    assert_eq!(manager.get_mate(&d.mate_id).unwrap().status, MateStatus::Conflict);
    assert_eq!(manager.get_mate(&fine.mate_id).unwrap().status, MateStatus::Ok);
    let hub_statuses: Vec<_> = manager.get_mates_for_component(&"hub".into()).iter().map(|m| m.status).collect();
    assert!(hub_statuses.iter().all(|s| *s == MateStatus::Warning));
}

#[test]
fn test_manager_round_trip_rebuilds_index() {
    let mut manager = MateManager::new();
    let m1 = manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    let m2 = manager.create_mate(MateType::Distance, face("b", "2"), face("c", "1"), distance(4.0)).unwrap();

    let value = manager.to_value().unwrap();
    assert_eq!(value["mates"].as_array().unwrap().len(), 2);
    assert_eq!(value["mates"][0]["mate_id"], m1.mate_id.as_str());

    let loaded = MateManager::from_value(value).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.to_vec(), manager.to_vec());
    let for_b: Vec<_> = loaded.get_mates_for_component(&"b".into()).iter().map(|m| m.mate_id.clone()).collect();
    assert_eq!(for_b, vec![m1.mate_id.clone(), m2.mate_id.clone()]);

    let json = loaded.to_json().unwrap();
    let again = MateManager::from_json(&json).unwrap();
    assert_eq!(again.get_mates_for_component(&"c".into()).len(), 1);
}

#[test]
fn test_manager_load_rejects_duplicate_ids() {
    let mut manager = MateManager::new();
    manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    let mut value = manager.to_value().unwrap();
    let first = value["mates"][0].clone();
    value["mates"].as_array_mut().unwrap().push(first);
    assert!(MateManager::from_value(value).is_err());
}

#[test]
fn test_clear() {
    let mut manager = MateManager::new();
    manager.create_mate(MateType::Coincident, face("a", "1"), face("b", "1"), MateParameters::new()).unwrap();
    manager.clear();
    assert!(manager.is_empty());
    assert!(manager.get_mates_for_component(&"a".into()).is_empty());
    assert_eq!(manager.mates().count(), 0);
}
