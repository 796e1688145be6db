//! Procedural secondary motion: hash-driven noise and aim offset.

use glam::{EulerRot, Quat, Vec3};
use xxhash_rust::xxh3::xxh3_64;

use crate::animation::LocalPose;
use crate::graph::layers::{AimOffset, ProceduralNoise};
use crate::skeleton::BoneMask;

/// Deterministic lattice value in `[-1, 1]`.
fn lattice(seed: u32, node: usize, axis: u32, cell: i64) -> f32 {
    let mut bytes = [0u8; 20];
    bytes[0..4].copy_from_slice(&seed.to_le_bytes());
    bytes[4..8].copy_from_slice(&(node as u32).to_le_bytes());
    bytes[8..12].copy_from_slice(&axis.to_le_bytes());
    bytes[12..20].copy_from_slice(&cell.to_le_bytes());

    // top 24 bits fit an f32 mantissa exactly
    let h = (xxh3_64(&bytes) >> 40) as f32 / (1u32 << 24) as f32;
    h * 2.0 - 1.0
}

/// Smoothly interpolated value noise in `[-1, 1]`.
#[must_use]
pub fn value_noise(seed: u32, node: usize, axis: u32, x: f32) -> f32 {
    let cell = x.floor();
    let f = x - cell;
    let cell = cell as i64;
    let a = lattice(seed, node, axis, cell);
    let b = lattice(seed, node, axis, cell + 1);
    let s = f * f * (3.0 - 2.0 * f);
    a + (b - a) * s
}

/// Rotational jitter for one node at `time` seconds.
#[must_use]
pub fn noise_rotation(noise: &ProceduralNoise, node: usize, time: f32) -> Quat {
    let x = time * noise.frequency;
    let [rx, ry, rz] = [0, 1, 2].map(|axis| value_noise(noise.seed, node, axis, x) * noise.amplitude);
    Quat::from_euler(EulerRot::XYZ, rx, ry, rz)
}

/// Post-multiplies jitter onto every node in `mask`, scaled by its weight.
pub fn apply_noise(pose: &mut LocalPose, mask: &BoneMask, noise: &ProceduralNoise, time: f32) {
    if noise.amplitude == 0.0 {
        return;
    }
    for node in mask.active_nodes() {
        if node >= pose.len() {
            continue;
        }
        let jitter = noise_rotation(noise, node, time);
        let jitter = Quat::IDENTITY.slerp(jitter, mask.weight(node));
        let local = &mut pose[node];
        local.rotation = (local.rotation * jitter).normalize();
    }
}

/// Spreads `yaw * weight` evenly over `spine_nodes`.
pub fn apply_aim(pose: &mut LocalPose, spine_nodes: &[usize], aim: &AimOffset) {
    if spine_nodes.is_empty() || aim.weight <= 0.0 {
        return;
    }
    let axis = aim.axis.try_normalize().unwrap_or(Vec3::Y);
    let share = aim.yaw * aim.weight / spine_nodes.len() as f32;
    let step = Quat::from_axis_angle(axis, share);

    for &node in spine_nodes {
        if node < pose.len() {
            let local = &mut pose[node];
            local.rotation = (step * local.rotation).normalize();
        }
    }
}
