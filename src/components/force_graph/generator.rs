//! Procedural resource generation.
//!
//! Produces a flat list of resources with randomized but schema-consistent
//! attributes. Every value is drawn from a fixed, non-empty pool, so
//! generation cannot fail.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use super::types::{Resource, ResourceId, ResourceKind, Status};

/// Default number of resources per generation.
pub const DEFAULT_NODE_COUNT: usize = 65;

/// Resource groups a resource can belong to.
pub const RESOURCE_GROUPS: [&str; 5] = [
	"rg-production",
	"rg-development",
	"rg-staging",
	"rg-shared",
	"rg-networking",
];

/// Azure regions a resource can be placed in.
pub const LOCATIONS: [&str; 5] = [
	"East US",
	"West US 2",
	"Central US",
	"North Europe",
	"Southeast Asia",
];

/// Subscriptions a resource can be billed to.
pub const SUBSCRIPTIONS: [&str; 3] = [
	"Production Subscription",
	"Development Subscription",
	"Shared Services",
];

/// Tag vocabulary: each key with its value pool.
pub const TAG_VOCABULARY: [(&str, &[&str]); 4] = [
	(
		"Environment",
		&["Production", "Development", "Staging", "Test"],
	),
	("Owner", &["TeamA", "TeamB", "TeamC", "Shared"]),
	("CostCenter", &["CC001", "CC002", "CC003"]),
	("Project", &["ProjectAlpha", "ProjectBeta", "ProjectGamma"]),
];

/// Resources per visual group bucket.
const GROUP_SIZE: usize = 12;

/// Generates `count` resources for the given generation.
pub fn generate<R: Rng + ?Sized>(count: usize, generation: u32, rng: &mut R) -> Vec<Resource> {
	(0..count)
		.map(|i| generate_one(i, generation, rng))
		.collect()
}

fn generate_one<R: Rng + ?Sized>(index: usize, generation: u32, rng: &mut R) -> Resource {
	let kind = *pick(&ResourceKind::ALL, rng);
	let resource_group = *pick(&RESOURCE_GROUPS, rng);
	let location = *pick(&LOCATIONS, rng);
	let subscription = *pick(&SUBSCRIPTIONS, rng);
	let status = draw_status(rng);
	let tags = generate_tags(rng);

	Resource {
		id: ResourceId {
			generation,
			index: index as u32,
		},
		name: resource_name(kind, index),
		display_name: display_name(kind, index),
		kind,
		category: kind.category(),
		resource_group,
		location,
		subscription,
		status,
		group: (index / GROUP_SIZE) as u32,
		tags,
	}
}

/// Uniform pick from a fixed pool. Pools are compile-time constants and never empty.
fn pick<'a, T, R: Rng + ?Sized>(pool: &'a [T], rng: &mut R) -> &'a T {
	match pool.choose(rng) {
		Some(item) => item,
		None => &pool[0],
	}
}

/// Roughly 90% running, 5% stopped, 5% warning.
fn draw_status<R: Rng + ?Sized>(rng: &mut R) -> Status {
	let r: f64 = rng.r#gen();
	if r < 0.05 {
		Status::Stopped
	} else if r < 0.1 {
		Status::Warning
	} else {
		Status::Running
	}
}

/// One to three tag draws; a repeated key keeps the last value drawn.
fn generate_tags<R: Rng + ?Sized>(rng: &mut R) -> BTreeMap<&'static str, &'static str> {
	let mut tags = BTreeMap::new();
	let count = rng.gen_range(1..=3);
	for _ in 0..count {
		let (key, values) = *pick(&TAG_VOCABULARY, rng);
		let value = *pick(values, rng);
		tags.insert(key, value);
	}
	tags
}

/// `virtual-machine-007`
pub fn resource_name(kind: ResourceKind, index: usize) -> String {
	let slug = kind
		.display_name()
		.to_lowercase()
		.split_whitespace()
		.collect::<Vec<_>>()
		.join("-");
	format!("{}-{:03}", slug, index)
}

/// `VirtualMachine007`
pub fn display_name(kind: ResourceKind, index: usize) -> String {
	let compact: String = kind.display_name().split_whitespace().collect();
	format!("{}{:03}", compact, index)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rand::SeedableRng;
	use rand::rngs::SmallRng;
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(1)]
	#[case(42)]
	#[case(9_001)]
	fn attributes_come_from_fixed_pools(#[case] seed: u64) {
		let mut rng = SmallRng::seed_from_u64(seed);
		let resources = generate(DEFAULT_NODE_COUNT, 0, &mut rng);

		assert_eq!(resources.len(), DEFAULT_NODE_COUNT);
		let ids: HashSet<_> = resources.iter().map(|r| r.id).collect();
		assert_eq!(ids.len(), resources.len());

		for r in &resources {
			assert!(ResourceKind::ALL.contains(&r.kind));
			assert_eq!(r.category, r.kind.category());
			assert!(RESOURCE_GROUPS.contains(&r.resource_group));
			assert!(LOCATIONS.contains(&r.location));
			assert!(SUBSCRIPTIONS.contains(&r.subscription));
			assert!((1..=3).contains(&r.tags.len()));
			for (key, value) in &r.tags {
				let (_, pool) = TAG_VOCABULARY
					.iter()
					.find(|(k, _)| k == key)
					.expect("tag key from vocabulary");
				assert!(pool.contains(value));
			}
		}
	}

	#[test]
	fn names_and_groups_follow_index() {
		let mut rng = SmallRng::seed_from_u64(7);
		let resources = generate(30, 3, &mut rng);

		let r = &resources[25];
		assert_eq!(r.id, ResourceId { generation: 3, index: 25 });
		assert_eq!(r.group, 2);
		assert!(r.name.ends_with("-025"));
		assert!(r.display_name.ends_with("025"));
		assert_eq!(resources[11].group, 0);
		assert_eq!(resources[12].group, 1);
	}

	#[test]
	fn name_formats() {
		assert_eq!(
			resource_name(ResourceKind::NetworkSecurityGroup, 7),
			"network-security-group-007"
		);
		assert_eq!(
			display_name(ResourceKind::NetworkSecurityGroup, 7),
			"NetworkSecurityGroup007"
		);
		assert_eq!(display_name(ResourceKind::SqlDatabase, 123), "SQLDatabase123");
	}

	#[test]
	fn status_distribution_is_roughly_90_5_5() {
		let mut rng = SmallRng::seed_from_u64(2024);
		let resources = generate(10_000, 0, &mut rng);
		let count = |s: Status| resources.iter().filter(|r| r.status == s).count() as f64;

		let running = count(Status::Running) / 10_000.0;
		let stopped = count(Status::Stopped) / 10_000.0;
		let warning = count(Status::Warning) / 10_000.0;

		assert!((running - 0.90).abs() < 0.02, "running = {running}");
		assert!((stopped - 0.05).abs() < 0.015, "stopped = {stopped}");
		assert!((warning - 0.05).abs() < 0.015, "warning = {warning}");
	}

	#[test]
	fn same_seed_same_resources() {
		let a = generate(20, 0, &mut SmallRng::seed_from_u64(5));
		let b = generate(20, 0, &mut SmallRng::seed_from_u64(5));
		let kinds = |v: &[Resource]| v.iter().map(|r| (r.kind, r.resource_group)).collect::<Vec<_>>();
		assert_eq!(kinds(&a), kinds(&b));
	}
}
