use crate::geometry::{ApproxEq, ComponentTransform, EntityType, GeometricEntity, Point3, Vector3};

#[test]
fn test_identity_is_default() {
    let t = ComponentTransform::default();
    assert!(t.is_identity());
    assert_eq!(t.scale, 1.0);
    assert!(!ComponentTransform::from_position(1.0, 0.0, 0.0).is_identity());
}

#[test]
fn test_combine_adds_components_and_multiplies_scale() {
    let a = ComponentTransform::from_position(1.0, 2.0, 3.0).with_rotation(10.0, 0.0, 5.0).with_scale(2.0);
    let b = ComponentTransform::from_position(-1.0, 1.0, 0.5).with_rotation(80.0, 90.0, 0.0).with_scale(0.5);
    let c = a.combine(&b);
    assert!(c.position.approx_eq(&Vector3::new(0.0, 3.0, 3.5)));
    assert!(c.rotation.approx_eq(&Vector3::new(90.0, 90.0, 5.0)));
    assert!(c.scale.approx_eq(&1.0));
}

#[test]
fn test_combine_commutes_unlike_composition() {
    // The componentwise approximation ignores rotation order...
    let rx = ComponentTransform::identity().with_rotation(90.0, 0.0, 0.0);
    let ry = ComponentTransform::identity().with_rotation(0.0, 90.0, 0.0);
    assert_eq!(rx.combine(&ry), ry.combine(&rx));

    // ...while true composition does not commute.
    let xy = rx.compose(&ry);
    let yx = ry.compose(&rx);
    assert!((xy - yx).norm() > 0.5);
}

#[test]
fn test_intrinsic_rotation_order() {
    // X then Y (intrinsic): R = Rx * Ry. Rotating +Z by Ry(90) gives +X, Rx leaves +X alone.
    let t = ComponentTransform::identity().with_rotation(90.0, 90.0, 0.0);
    let d = t.apply_to_direction(&Vector3::z());
    assert!(d.approx_eq(&Vector3::x()), "got {:?}", d);
}

#[test]
fn test_point_receives_scale_rotation_translation() {
    let t = ComponentTransform::from_position(10.0, 0.0, 0.0)
        .with_rotation(0.0, 0.0, 90.0)
        .with_scale(2.0);
    let p = t.apply_to_point(&Point3::new(1.0, 0.0, 0.0));
    assert!(p.approx_eq(&Point3::new(10.0, 2.0, 0.0)), "got {:?}", p);
}

#[test]
fn test_matrix_matches_point_application() {
    let t = ComponentTransform::from_position(1.0, -2.0, 3.0)
        .with_rotation(30.0, 45.0, 60.0)
        .with_scale(1.5);
    let p = Point3::new(0.3, 0.7, -1.2);
    let via_matrix = t.to_matrix().transform_point(&p);
    assert!(via_matrix.approx_eq(&t.apply_to_point(&p)));
}

#[test]
fn test_entity_direction_ignores_translation_and_scale() {
    let entity = GeometricEntity::axis(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0));
    assert!(entity.direction.approx_eq(&Vector3::z()));

    let t = ComponentTransform::from_position(5.0, 5.0, 5.0)
        .with_rotation(90.0, 0.0, 0.0)
        .with_scale(4.0);
    let moved = entity.transformed(&t);
    assert!(moved.direction.approx_eq(&Vector3::new(0.0, -1.0, 0.0)), "got {:?}", moved.direction);
    assert!(moved.point.approx_eq(&Point3::new(9.0, 5.0, 5.0)));
    assert_eq!(moved.entity_type, EntityType::Axis);
}

#[test]
fn test_nudged_touches_one_dof() {
    let t = ComponentTransform::from_position(1.0, 2.0, 3.0).with_rotation(4.0, 5.0, 6.0);
    for i in 0..6 {
        let n = t.nudged(i, 0.5);
        for j in 0..6 {
            let expected = if i == j { t.dof(j) + 0.5 } else { t.dof(j) };
            assert_eq!(n.dof(j), expected);
        }
    }
}

#[test]
fn test_transform_serializes_as_arrays() {
    let t = ComponentTransform::from_position(1.0, 2.0, 3.0);
    let json = serde_json::to_value(t).unwrap();
    assert_eq!(json["position"], serde_json::json!([1.0, 2.0, 3.0]));

    let loaded: ComponentTransform =
        serde_json::from_value(serde_json::json!({ "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0] })).unwrap();
    assert!(loaded.is_identity());
}
