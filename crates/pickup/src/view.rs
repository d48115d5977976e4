//! Read-only hierarchical view: pickup point → receptions → products.
//!
//! Produced only by the listing query and never persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pvz_core::{PickupPointId, ReceptionId};

use crate::pickup_point::PickupPoint;
use crate::product::Product;
use crate::reception::Reception;

/// A reception together with its products (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionView {
    pub reception: Reception,
    pub products: Vec<Product>,
}

/// A pickup point together with its receptions (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPointView {
    pub pickup_point: PickupPoint,
    pub receptions: Vec<ReceptionView>,
}

/// Assemble the tree from three flat, already-ordered row sets.
///
/// Grouping is stable: the relative order of `points`, `receptions` and
/// `products` is preserved inside every group. Receptions whose pickup point
/// is not in `points` (and products whose reception is not in `receptions`)
/// are dropped. Every point appears in the output, with an empty reception
/// list if nothing matched.
pub fn assemble(
    points: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    products: Vec<Product>,
) -> Vec<PickupPointView> {
    let mut products_by_reception: HashMap<ReceptionId, Vec<Product>> = HashMap::new();
    for product in products {
        products_by_reception
            .entry(product.reception_id)
            .or_default()
            .push(product);
    }

    let mut receptions_by_point: HashMap<PickupPointId, Vec<ReceptionView>> = HashMap::new();
    for reception in receptions {
        let products = products_by_reception
            .remove(&reception.id)
            .unwrap_or_default();
        receptions_by_point
            .entry(reception.pickup_point_id)
            .or_default()
            .push(ReceptionView {
                reception,
                products,
            });
    }

    points
        .into_iter()
        .map(|pickup_point| {
            let receptions = receptions_by_point
                .remove(&pickup_point.id)
                .unwrap_or_default();
            PickupPointView {
                pickup_point,
                receptions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use pvz_core::{CityId, ProductTypeId};

    use crate::pickup_point::City;
    use crate::product::ProductType;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    fn point(minutes: i64) -> PickupPoint {
        PickupPoint {
            id: PickupPointId::new(),
            registered_at: base_time() + Duration::minutes(minutes),
            city: City::new(CityId(1), "Москва"),
        }
    }

    fn reception_for(point: &PickupPoint, minutes: i64) -> Reception {
        Reception::start(point.id, base_time() + Duration::minutes(minutes))
    }

    fn product_for(reception: &Reception, minutes: i64) -> Product {
        Product {
            id: pvz_core::ProductId::new(),
            created_at: base_time() + Duration::minutes(minutes),
            product_type: ProductType::new(ProductTypeId(1), "электроника"),
            reception_id: reception.id,
        }
    }

    #[test]
    fn builds_nested_tree_in_input_order() {
        let p = point(0);
        let r = reception_for(&p, 10);
        let b = product_for(&r, 12);
        let a = product_for(&r, 11);

        let tree = assemble(vec![p.clone()], vec![r.clone()], vec![b.clone(), a.clone()]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].pickup_point, p);
        assert_eq!(tree[0].receptions.len(), 1);
        assert_eq!(tree[0].receptions[0].reception, r);
        assert_eq!(tree[0].receptions[0].products, vec![b, a]);
    }

    #[test]
    fn point_without_matching_receptions_is_kept_empty() {
        let p1 = point(1);
        let p2 = point(0);
        let r = reception_for(&p1, 5);

        let tree = assemble(vec![p1.clone(), p2.clone()], vec![r], vec![]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].receptions.len(), 1);
        assert_eq!(tree[1].pickup_point, p2);
        assert!(tree[1].receptions.is_empty());
    }

    #[test]
    fn orphans_are_dropped() {
        let p = point(0);
        let other = point(1);
        let orphan_reception = reception_for(&other, 3);
        let orphan_product = product_for(&orphan_reception, 4);

        let tree = assemble(vec![p], vec![orphan_reception], vec![orphan_product]);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].receptions.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: grouping never reorders or loses rows that belong to a
        /// listed point/reception.
        #[test]
        fn grouping_preserves_relative_order(
            point_count in 1usize..6,
            reception_owners in prop::collection::vec(0usize..6, 0..20),
            product_owners in prop::collection::vec(0usize..20, 0..40),
        ) {
            let points: Vec<PickupPoint> = (0..point_count).map(|i| point(i as i64)).collect();
            let receptions: Vec<Reception> = reception_owners
                .iter()
                .enumerate()
                .filter(|(_, owner)| **owner < point_count)
                .map(|(i, owner)| reception_for(&points[*owner], i as i64))
                .collect();
            let products: Vec<Product> = product_owners
                .iter()
                .enumerate()
                .filter(|(_, owner)| **owner < receptions.len())
                .map(|(i, owner)| product_for(&receptions[*owner], i as i64))
                .collect();

            let tree = assemble(points.clone(), receptions.clone(), products.clone());

            prop_assert_eq!(tree.len(), points.len());
            for (view, p) in tree.iter().zip(points.iter()) {
                prop_assert_eq!(&view.pickup_point, p);

                let expected: Vec<&Reception> = receptions
                    .iter()
                    .filter(|r| r.pickup_point_id == p.id)
                    .collect();
                let actual: Vec<&Reception> = view.receptions.iter().map(|rv| &rv.reception).collect();
                prop_assert_eq!(actual, expected);

                for rv in &view.receptions {
                    let expected: Vec<&Product> = products
                        .iter()
                        .filter(|pr| pr.reception_id == rv.reception.id)
                        .collect();
                    let actual: Vec<&Product> = rv.products.iter().collect();
                    prop_assert_eq!(actual, expected);
                }
            }
        }
    }
}
