//! Two arms of an avatar-like skeleton chasing moving goals.
//!
//! The left arm resolves its whole chain every tick; the right arm corrects a
//! single joint per tick, which is what a visual debugger would step through.
//!
//! Run with `RUST_LOG=debug cargo run --example animated_chain`.

use ccd_ik::ik::{BallSocketConstraint, Bone, ChainDriver, HingeConstraint, IkChain, Rig, StepMode};
use ccd_ik::render::{DebugLines, SkinningPalette};
use glam::{Mat4, Vec3};
use std::f32::consts::TAU;

const TICKS: u32 = 240;

fn avatar() -> ccd_ik::Result<Rig> {
    Rig::builder()
        .root_world(Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)))
        .add_bone(Bone::from_translation(Vec3::new(0.0, 1.0, 0.0)).with_name("hips"))
        .add_bone(Bone::from_translation(Vec3::new(0.0, 0.3, 0.0)).with_name("spine").with_parent(0))
        .add_bone(Bone::from_translation(Vec3::new(0.0, 0.3, 0.0)).with_name("chest").with_parent(1))
        .add_bone(
            Bone::from_translation(Vec3::new(0.2, 0.0, 0.0))
                .with_name("shoulder_l")
                .with_parent(2)
                .with_constraint(BallSocketConstraint::new(120.0)),
        )
        .add_bone(
            Bone::from_translation(Vec3::new(0.3, 0.0, 0.0))
                .with_name("elbow_l")
                .with_parent(3)
                .with_constraint(HingeConstraint::new(Vec3::Y, -150.0, 0.0)),
        )
        .add_bone(Bone::from_translation(Vec3::new(0.25, 0.0, 0.0)).with_name("wrist_l").with_parent(4))
        .add_bone(
            Bone::from_translation(Vec3::new(-0.2, 0.0, 0.0))
                .with_name("shoulder_r")
                .with_parent(2)
                .with_constraint(BallSocketConstraint::new(120.0)),
        )
        .add_bone(Bone::from_translation(Vec3::new(-0.3, 0.0, 0.0)).with_name("elbow_r").with_parent(6))
        .add_bone(Bone::from_translation(Vec3::new(-0.25, 0.0, 0.0)).with_name("wrist_r").with_parent(7))
        .build()
}

fn main() -> ccd_ik::Result<()> {
    env_logger::init();

    let mut rig = avatar()?;
    let left = IkChain::from_end_effector(&rig, rig.find_bone("wrist_l")?, 3)?;
    let right = IkChain::from_end_effector(&rig, rig.find_bone("wrist_r")?, 3)?;

    let mut left_driver = ChainDriver::new(StepMode::FullChain);
    let mut right_driver = ChainDriver::new(StepMode::SingleStep);
    let mut palette = SkinningPalette::from_rig(&rig);

    for tick in 0..TICKS {
        let phase = tick as f32 / TICKS as f32 * TAU;
        let left_goal = Vec3::new(0.5, 1.6 + 0.2 * phase.sin(), -0.8 + 0.2 * phase.cos());
        let right_goal = Vec3::new(-0.4, 1.4, -0.7 + 0.3 * phase.sin());

        let l = left_driver.tick(&mut rig, &left, left_goal)?;
        let r = right_driver.tick(&mut rig, &right, right_goal)?;
        palette.update(&rig);

        if tick % 30 == 0 {
            let lines = DebugLines::from_rig(&rig, Some(&left), Some(left_goal), 0.03);
            println!(
                "tick {tick:>3}  left {:.4} ({:?})  right {:.4} ({:?}, cursor {})  {} lines, {} palette bytes",
                l.distance,
                l.state,
                r.distance,
                r.state,
                right_driver.cursor(),
                lines.line_count(),
                palette.as_bytes().len()
            );
        }
    }

    for bone in 0..rig.bone_count() {
        let p = rig.bone_position(bone)?;
        println!("{:<12} {:>8.3} {:>8.3} {:>8.3}", rig.name(bone).unwrap_or("-"), p.x, p.y, p.z);
    }

    rig.reset_pose();
    println!("pose reset, left wrist back at {:?}", rig.end_effector_position(&left)?);
    Ok(())
}
