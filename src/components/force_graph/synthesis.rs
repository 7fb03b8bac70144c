//! Relationship synthesis.
//!
//! Turns a flat resource list into a plausible connection graph:
//! 1. Same-group pass: each resource connects to resources in its own
//!    resource group when the affinity table allows it (or on random noise),
//!    up to a per-kind connection cap.
//! 2. Cross-group pass: occasionally one extra `cross-rg` link to a shared
//!    network or vault resource in another group.
//! 3. De-duplication by unordered pair, first occurrence wins.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use super::types::{Connection, ConnectionKind, Resource, ResourceId, ResourceKind};

/// Tunable probabilities for the random parts of synthesis.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
	/// Chance that two same-group resources connect with no affinity rule.
	pub connect_noise_probability: f64,
	/// Chance that a resource still under its cap gets one cross-group link.
	pub cross_group_probability: f64,
}

impl Default for SynthesisConfig {
	fn default() -> Self {
		Self {
			connect_noise_probability: 0.2,
			cross_group_probability: 0.3,
		}
	}
}

/// Strength of every cross-group link.
const CROSS_GROUP_STRENGTH: f64 = 0.3;

/// Maximum same-group connections a resource initiates.
pub fn max_connections(kind: ResourceKind) -> usize {
	match kind {
		ResourceKind::VirtualNetwork => 8,
		ResourceKind::LoadBalancer => 6,
		ResourceKind::ApplicationGateway => 5,
		ResourceKind::VirtualMachine => 4,
		ResourceKind::AppService => 3,
		ResourceKind::SqlDatabase => 3,
		ResourceKind::KeyVault => 6,
		ResourceKind::StorageAccount => 4,
		_ => 2,
	}
}

/// Kinds a resource of `kind` naturally connects to. Consulted in both directions.
fn affinity(kind: ResourceKind) -> &'static [ResourceKind] {
	use ResourceKind::*;
	match kind {
		VirtualMachine => &[
			VirtualNetwork,
			StorageAccount,
			LoadBalancer,
			NetworkSecurityGroup,
		],
		AppService => &[SqlDatabase, StorageAccount, KeyVault, ApplicationGateway],
		FunctionApp => &[StorageAccount, KeyVault, CosmosDb, AppService],
		SqlDatabase => &[AppService, VirtualMachine, KeyVault],
		LoadBalancer => &[VirtualMachine, VirtualNetwork],
		ApplicationGateway => &[AppService, VirtualMachine, VirtualNetwork],
		StorageAccount => &[VirtualMachine, AppService, FunctionApp],
		KeyVault => &[AppService, FunctionApp, VirtualMachine, SqlDatabase],
		VirtualNetwork => &[
			VirtualMachine,
			LoadBalancer,
			ApplicationGateway,
			NetworkSecurityGroup,
		],
		NetworkSecurityGroup => &[VirtualNetwork, VirtualMachine],
		_ => &[],
	}
}

/// True when either kind lists the other in its affinity table.
pub fn has_affinity(a: ResourceKind, b: ResourceKind) -> bool {
	affinity(a).contains(&b) || affinity(b).contains(&a)
}

/// Affinity rule with random noise on top.
///
/// The noise draw happens only when no rule matched.
fn should_connect<R: Rng + ?Sized>(
	a: &Resource,
	b: &Resource,
	config: &SynthesisConfig,
	rng: &mut R,
) -> bool {
	has_affinity(a.kind, b.kind) || rng.gen_bool(config.connect_noise_probability.clamp(0.0, 1.0))
}

/// Classifies a non-cross-group connection from its two endpoints.
pub fn connection_kind(a: &Resource, b: &Resource) -> ConnectionKind {
	if a.kind.is_network_hub() || b.kind.is_network_hub() {
		ConnectionKind::Network
	} else if a.kind.is_vault() || b.kind.is_vault() {
		ConnectionKind::Security
	} else if a.resource_group == b.resource_group {
		ConnectionKind::SameRg
	} else {
		ConnectionKind::Dependency
	}
}

/// Spring strength for a non-cross-group connection.
pub fn connection_strength(a: &Resource, b: &Resource) -> f64 {
	if a.resource_group == b.resource_group {
		0.8
	} else if a.kind.is_network_hub() || b.kind.is_network_hub() {
		0.9
	} else {
		0.5
	}
}

/// Whether `candidate` may receive a cross-group link from `from`.
fn is_cross_group_candidate(from: &Resource, candidate: &Resource) -> bool {
	candidate.resource_group != from.resource_group
		&& (candidate.kind.is_network_hub()
			|| candidate.kind.is_vault()
			|| from.kind.is_network_hub())
}

/// Derives the de-duplicated connection set for `resources`.
///
/// Iteration follows slice order, so for a fixed RNG state the output is
/// fully deterministic.
///
/// The cross-group draw is only taken by a resource that is still below its
/// cap after the same-group pass. The cross-group link is not counted, but
/// because of that gate a resource never initiates more than
/// [`max_connections`] links in total.
pub fn synthesize<R: Rng + ?Sized>(
	resources: &[Resource],
	config: &SynthesisConfig,
	rng: &mut R,
) -> Vec<Connection> {
	let mut connections = Vec::new();

	for node in resources {
		let cap = max_connections(node.kind);
		let mut count = 0;

		for target in resources
			.iter()
			.filter(|t| t.resource_group == node.resource_group && t.id != node.id)
		{
			if count < cap && should_connect(node, target, config, rng) {
				connections.push(Connection {
					source: node.id,
					target: target.id,
					kind: connection_kind(node, target),
					strength: connection_strength(node, target),
				});
				count += 1;
			}
		}

		// Not counted against the cap.
		if count < cap && rng.gen_bool(config.cross_group_probability.clamp(0.0, 1.0)) {
			let candidates: Vec<&Resource> = resources
				.iter()
				.filter(|c| is_cross_group_candidate(node, c))
				.collect();
			if let Some(target) = candidates.choose(rng) {
				connections.push(Connection {
					source: node.id,
					target: target.id,
					kind: ConnectionKind::CrossRg,
					strength: CROSS_GROUP_STRENGTH,
				});
			}
		}
	}

	dedup_connections(connections)
}

/// Keeps the first connection for each unordered pair, in input order.
pub fn dedup_connections(connections: Vec<Connection>) -> Vec<Connection> {
	let mut seen: HashSet<(ResourceId, ResourceId)> = HashSet::new();
	connections
		.into_iter()
		.filter(|c| {
			if c.source == c.target
				|| seen.contains(&(c.source, c.target))
				|| seen.contains(&(c.target, c.source))
			{
				return false;
			}
			seen.insert((c.source, c.target));
			true
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use std::collections::{BTreeMap, HashMap};

	use rand::SeedableRng;
	use rand::rngs::SmallRng;
	use rstest::rstest;

	use super::super::generator::generate;
	use super::super::types::Status;
	use super::*;

	fn resource(index: u32, kind: ResourceKind, group: &'static str) -> Resource {
		Resource {
			id: ResourceId {
				generation: 0,
				index,
			},
			name: format!("r-{index}"),
			display_name: format!("R{index}"),
			kind,
			category: kind.category(),
			resource_group: group,
			location: "East US",
			subscription: "Shared Services",
			status: Status::Running,
			group: 0,
			tags: BTreeMap::new(),
		}
	}

	fn edge(source: u32, target: u32) -> Connection {
		Connection {
			source: ResourceId {
				generation: 0,
				index: source,
			},
			target: ResourceId {
				generation: 0,
				index: target,
			},
			kind: ConnectionKind::Dependency,
			strength: 0.5,
		}
	}

	#[rstest]
	#[case(3)]
	#[case(17)]
	#[case(256)]
	#[case(65_535)]
	fn no_duplicate_pairs_or_self_loops(#[case] seed: u64) {
		let mut rng = SmallRng::seed_from_u64(seed);
		let resources = generate(65, 0, &mut rng);
		let connections = synthesize(&resources, &SynthesisConfig::default(), &mut rng);

		let mut pairs = HashSet::new();
		for c in &connections {
			assert_ne!(c.source, c.target);
			let key = if c.source < c.target {
				(c.source, c.target)
			} else {
				(c.target, c.source)
			};
			assert!(pairs.insert(key), "duplicate pair {key:?}");
			assert!(c.strength > 0.0 && c.strength <= 1.0);
		}
	}

	#[test]
	fn dedup_keeps_first_occurrence() {
		let mut later = edge(1, 0);
		later.kind = ConnectionKind::Network;
		let kept = dedup_connections(vec![edge(0, 1), later, edge(0, 2), edge(0, 1)]);

		assert_eq!(kept.len(), 2);
		assert_eq!(kept[0], edge(0, 1));
		assert_eq!(kept[1], edge(0, 2));
	}

	#[test]
	fn classification_order() {
		let vnet = resource(0, ResourceKind::VirtualNetwork, "rg-a");
		let vault = resource(1, ResourceKind::KeyVault, "rg-b");
		let vm_a = resource(2, ResourceKind::VirtualMachine, "rg-a");
		let vm_b = resource(3, ResourceKind::VirtualMachine, "rg-b");

		assert_eq!(connection_kind(&vault, &vnet), ConnectionKind::Network);
		assert_eq!(connection_kind(&vm_a, &vault), ConnectionKind::Security);
		assert_eq!(connection_kind(&vm_a, &vnet), ConnectionKind::Network);
		assert_eq!(
			connection_kind(&vm_a, &resource(4, ResourceKind::AppService, "rg-a")),
			ConnectionKind::SameRg
		);
		assert_eq!(connection_kind(&vm_a, &vm_b), ConnectionKind::Dependency);

		assert_eq!(connection_strength(&vm_a, &vnet), 0.8);
		assert_eq!(connection_strength(&vm_b, &vnet), 0.9);
		assert_eq!(connection_strength(&vm_a, &vm_b), 0.5);
	}

	#[test]
	fn classification_is_reproducible_from_endpoints() {
		let mut rng = SmallRng::seed_from_u64(99);
		let resources = generate(65, 0, &mut rng);
		let connections = synthesize(&resources, &SynthesisConfig::default(), &mut rng);
		let by_id: HashMap<_, _> = resources.iter().map(|r| (r.id, r)).collect();

		for c in connections.iter().filter(|c| c.kind != ConnectionKind::CrossRg) {
			let (a, b) = (by_id[&c.source], by_id[&c.target]);
			assert_eq!(connection_kind(a, b), c.kind);
			assert_eq!(connection_strength(a, b), c.strength);
		}
	}

	#[test]
	fn affinity_is_symmetric() {
		// Storage lists App Service; App Service lists Storage. Cosmos DB lists
		// nothing, but Function App lists Cosmos DB.
		assert!(has_affinity(ResourceKind::CosmosDb, ResourceKind::FunctionApp));
		assert!(has_affinity(ResourceKind::FunctionApp, ResourceKind::CosmosDb));
		assert!(!has_affinity(ResourceKind::PublicIp, ResourceKind::RedisCache));
	}

	#[test]
	fn caps_apply_without_noise() {
		let config = SynthesisConfig {
			connect_noise_probability: 0.0,
			cross_group_probability: 0.0,
		};
		let mut resources = vec![resource(0, ResourceKind::AppService, "rg-a")];
		for i in 1..=6 {
			resources.push(resource(i, ResourceKind::SqlDatabase, "rg-a"));
		}
		let connections = synthesize(&resources, &config, &mut SmallRng::seed_from_u64(1));

		let from_app = connections
			.iter()
			.filter(|c| c.source == resources[0].id)
			.count();
		assert_eq!(from_app, max_connections(ResourceKind::AppService));
		// Databases have no affinity with each other, only with the app service.
		assert!(connections.iter().all(|c| c.source == resources[0].id
			|| c.target == resources[0].id));
	}

	#[test]
	fn saturated_resource_skips_cross_group_link() {
		let config = SynthesisConfig {
			connect_noise_probability: 0.0,
			cross_group_probability: 1.0,
		};
		let mut resources = vec![resource(0, ResourceKind::AppService, "rg-a")];
		for i in 1..=3 {
			resources.push(resource(i, ResourceKind::SqlDatabase, "rg-a"));
		}
		resources.push(resource(4, ResourceKind::KeyVault, "rg-b"));
		let connections = synthesize(&resources, &config, &mut SmallRng::seed_from_u64(8));

		let from_app: Vec<_> = connections
			.iter()
			.filter(|c| c.source == resources[0].id)
			.collect();
		assert_eq!(from_app.len(), max_connections(ResourceKind::AppService));
		assert!(from_app.iter().all(|c| c.kind != ConnectionKind::CrossRg));

		// Each database only used one of its three slots, so it reaches the vault.
		let cross_from_db = connections
			.iter()
			.filter(|c| c.kind == ConnectionKind::CrossRg && c.target == resources[4].id)
			.count();
		assert_eq!(cross_from_db, 3);
	}

	#[test]
	fn cross_group_links_target_shared_services() {
		let config = SynthesisConfig {
			connect_noise_probability: 0.0,
			cross_group_probability: 1.0,
		};
		let resources = vec![
			resource(0, ResourceKind::RedisCache, "rg-a"),
			resource(1, ResourceKind::KeyVault, "rg-b"),
			resource(2, ResourceKind::PublicIp, "rg-c"),
		];
		let connections = synthesize(&resources, &config, &mut SmallRng::seed_from_u64(4));

		let cross: Vec<_> = connections
			.iter()
			.filter(|c| c.kind == ConnectionKind::CrossRg)
			.collect();
		assert!(!cross.is_empty());
		for c in cross {
			assert_eq!(c.strength, CROSS_GROUP_STRENGTH);
			assert_eq!(c.target, resources[1].id);
		}
	}

	#[test]
	fn empty_input_yields_no_connections() {
		let connections = synthesize(&[], &SynthesisConfig::default(), &mut SmallRng::seed_from_u64(0));
		assert!(connections.is_empty());
	}
}
