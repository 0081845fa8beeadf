//! Actuation collaborator interface: where motion goals go

use crate::error::{FollowError, Result};
use nalgebra::{Quaternion, UnitQuaternion};
use reidtrack::MotionCommand;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

/// Navigation goal derived from one motion command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPose {
    /// Coordinate frame the goal is expressed in
    pub frame_id: String,
    /// Frame sequence number the goal was produced on
    pub seq: u64,
    /// Wall-clock time in milliseconds since the Unix epoch
    pub stamp_ms: u64,
    /// Forward offset on x, zero elsewhere
    pub position: [f64; 3],
    /// Heading as a unit quaternion, `[x, y, z, w]`
    pub orientation: [f64; 4],
}

impl TargetPose {
    pub fn from_command(command: &MotionCommand, frame_id: &str, seq: u64) -> Self {
        let pose = command.target_pose();
        let t = pose.translation.vector;
        let q = pose.rotation;
        let stamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            frame_id: frame_id.to_string(),
            seq,
            stamp_ms,
            position: [t.x, t.y, t.z],
            orientation: [q.i, q.j, q.k, q.w],
        }
    }

    /// Heading encoded in the orientation, in radians
    pub fn yaw(&self) -> f64 {
        let [x, y, z, w] = self.orientation;
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));
        let (_, _, yaw) = rotation.euler_angles();
        yaw
    }
}

/// Consumer of navigation goals
pub trait CommandSink: Send {
    fn send(&mut self, goal: &TargetPose) -> Result<()>;

    /// Get the sink name (for logging/debugging)
    fn name(&self) -> &str;
}

/// Logs every goal at info level
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl CommandSink for LogSink {
    fn send(&mut self, goal: &TargetPose) -> Result<()> {
        log::info!(
            "Goal #{} in {}: forward={:.3}, yaw={:.3} rad",
            goal.seq,
            goal.frame_id,
            goal.position[0],
            goal.yaw()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Writes one JSON document per goal, newline separated
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> CommandSink for JsonLinesSink<W> {
    fn send(&mut self, goal: &TargetPose) -> Result<()> {
        serde_json::to_writer(&mut self.writer, goal)?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| FollowError::actuation(format!("Failed to write goal: {}", e)))?;
        self.written += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "json-lines"
    }
}

/// Keeps every goal in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub goals: Vec<TargetPose>,
}

impl CommandSink for RecordingSink {
    fn send(&mut self, goal: &TargetPose) -> Result<()> {
        self.goals.push(goal.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pose_from_command() {
        let cmd = MotionCommand {
            yaw: -0.25,
            forward_offset: 0.195,
        };
        let goal = TargetPose::from_command(&cmd, "base_link", 7);

        assert_eq!(goal.frame_id, "base_link");
        assert_eq!(goal.seq, 7);
        assert_abs_diff_eq!(goal.position[0], 0.195);
        assert_eq!(&goal.position[1..], &[0.0, 0.0]);
        assert_abs_diff_eq!(goal.orientation[0], 0.0);
        assert_abs_diff_eq!(goal.orientation[1], 0.0);
        assert_abs_diff_eq!(goal.orientation[2], (-0.125f64).sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(goal.orientation[3], (-0.125f64).cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(goal.yaw(), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let goal = TargetPose::from_command(&MotionCommand::default(), "base_link", 1);
        sink.send(&goal).unwrap();
        sink.send(&goal).unwrap();
        assert_eq!(sink.written(), 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: TargetPose = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, goal);
    }
}
