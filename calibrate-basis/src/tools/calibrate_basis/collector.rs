use crate::basis::{Basis, are_coplanar, solve_basis};
use crate::tools::markers::MarkerSink;
use crate::tools::snapping::PickSource;
use bevy::math::DVec3;
use bevy::prelude::*;
use constants::calibration::{BASIS_POINT_COUNT, CANCEL_KEY_CODE};

/// Interaction state of the point collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectorState {
    /// Tool inactive, picks are ignored.
    #[default]
    Idle,
    /// Accepting picks, zero to three points buffered.
    Collecting,
    /// Fourth point buffered, waiting for the coplanarity check.
    Ready,
}

/// What a single pick did to the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// No snap under the pointer, or the collector was not collecting.
    Ignored,
    /// Point buffered at `index`; more points are needed.
    Accepted { index: usize, point: DVec3 },
    /// Fourth point made the set coplanar; buffer cleared for another try.
    RejectedCoplanar,
    /// Fourth point completed a valid set; the tool is now idle.
    Solved(Basis),
}

/// Gathers the four basis points and runs the solver once they are valid.
#[derive(Resource, Debug, Default)]
pub struct PointCollector {
    state: CollectorState,
    points: Vec<DVec3>,
}

impl PointCollector {
    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != CollectorState::Idle
    }

    /// Buffered points in pick order.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Start collecting with an empty buffer. Returns false if already active.
    pub fn activate(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.points.clear();
        self.state = CollectorState::Collecting;
        info!("Calibrate basis tool activated.");
        true
    }

    /// Drop buffered points and stop collecting. Returns false if already idle.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.points.clear();
        self.state = CollectorState::Idle;
        info!("Calibrate basis tool deactivated.");
        true
    }

    /// Discard the current attempt but keep collecting.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        debug!("Calibration cancelled with {} point(s) buffered", self.points.len());
        self.points.clear();
        self.state = CollectorState::Collecting;
        true
    }

    /// Key release from the host; only the cancel key is consumed.
    pub fn handle_key_up(&mut self, key_code: u32) -> bool {
        key_code == CANCEL_KEY_CODE && self.cancel()
    }

    /// Primary-button click: take whatever the pick source has under the pointer.
    pub fn handle_click<P, M>(&mut self, source: &P, sink: &mut M) -> PickOutcome
    where
        P: PickSource + ?Sized,
        M: MarkerSink + ?Sized,
    {
        match source.current_pick() {
            Some(snap) => self.accept_point(snap.intersect_point.as_dvec3(), sink),
            None => PickOutcome::Ignored,
        }
    }

    /// Buffer a picked point and, on the fourth, validate and solve.
    pub fn accept_point<M>(&mut self, point: DVec3, sink: &mut M) -> PickOutcome
    where
        M: MarkerSink + ?Sized,
    {
        if self.state != CollectorState::Collecting || self.points.len() >= BASIS_POINT_COUNT {
            return PickOutcome::Ignored;
        }

        self.points.push(point);
        let index = self.points.len() - 1;
        sink.render_marker(point, index);
        debug!("Basis point {} accepted at {:?}", index, point);

        if self.points.len() < BASIS_POINT_COUNT {
            return PickOutcome::Accepted { index, point };
        }

        self.state = CollectorState::Ready;
        self.resolve_ready(sink)
    }

    fn resolve_ready<M>(&mut self, sink: &mut M) -> PickOutcome
    where
        M: MarkerSink + ?Sized,
    {
        let points: [DVec3; BASIS_POINT_COUNT] = match self.points.as_slice().try_into() {
            Ok(points) => points,
            Err(_) => {
                self.points.clear();
                self.state = CollectorState::Collecting;
                return PickOutcome::Ignored;
            }
        };
        self.points.clear();

        if are_coplanar(&points) {
            warn!("Basis points are coplanar, pick four points again");
            self.state = CollectorState::Collecting;
            sink.clear_markers();
            return PickOutcome::RejectedCoplanar;
        }

        let basis = solve_basis(&points);
        self.state = CollectorState::Idle;
        info!(
            "Oblique basis calibrated: origin {:?}, oblique sum {:?}",
            basis.origin, basis.oblique_sum
        );
        PickOutcome::Solved(basis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::markers::{MarkerQueue, MarkerRequest};
    use crate::tools::snapping::{SnapResult, SnapType};

    struct FixedPick(Option<Vec3>);

    impl PickSource for FixedPick {
        fn current_pick(&self) -> Option<SnapResult> {
            self.0.map(|intersect_point| SnapResult {
                intersect_point,
                snap_type: SnapType::Vertex,
                distance: 1.0,
            })
        }
    }

    fn collecting() -> PointCollector {
        let mut collector = PointCollector::default();
        assert!(collector.activate());
        collector
    }

    #[test]
    fn starts_idle_and_ignores_picks() {
        let mut collector = PointCollector::default();
        let mut sink = MarkerQueue::default();
        assert_eq!(collector.state(), CollectorState::Idle);
        assert_eq!(collector.accept_point(DVec3::ONE, &mut sink), PickOutcome::Ignored);
        assert!(collector.points().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn miss_under_pointer_changes_nothing() {
        let mut collector = collecting();
        let mut sink = MarkerQueue::default();
        collector.accept_point(DVec3::ZERO, &mut sink);

        let outcome = collector.handle_click(&FixedPick(None), &mut sink);
        assert_eq!(outcome, PickOutcome::Ignored);
        assert_eq!(collector.points().len(), 1);
        assert_eq!(collector.state(), CollectorState::Collecting);
    }

    #[test]
    fn accepted_points_get_ordinal_markers() {
        let mut collector = collecting();
        let mut sink = MarkerQueue::default();

        let outcome = collector.handle_click(&FixedPick(Some(Vec3::X)), &mut sink);
        assert_eq!(outcome, PickOutcome::Accepted { index: 0, point: DVec3::X });
        collector.handle_click(&FixedPick(Some(Vec3::Y)), &mut sink);

        assert_eq!(
            sink.drain(),
            vec![
                MarkerRequest::Render { position: DVec3::X, index: 0 },
                MarkerRequest::Render { position: DVec3::Y, index: 1 },
            ]
        );
    }

    #[test]
    fn four_valid_points_solve_and_go_idle() {
        let mut collector = collecting();
        let mut sink = MarkerQueue::default();
        for p in [DVec3::ZERO, DVec3::X, DVec3::Y] {
            collector.accept_point(p, &mut sink);
        }

        let PickOutcome::Solved(basis) = collector.accept_point(DVec3::Z, &mut sink) else {
            panic!("expected a solved basis");
        };
        assert_eq!(basis.oblique_sum, DVec3::ONE);
        assert_eq!(collector.state(), CollectorState::Idle);
        assert!(collector.points().is_empty());

        // Markers stay up after a solve.
        assert!(!sink.drain().contains(&MarkerRequest::ClearAll));
    }

    #[test]
    fn coplanar_set_is_dropped_and_tool_stays_active() {
        let mut collector = collecting();
        let mut sink = MarkerQueue::default();
        for p in [DVec3::ZERO, DVec3::X, DVec3::Y] {
            collector.accept_point(p, &mut sink);
        }

        let outcome = collector.accept_point(DVec3::new(2.0, 3.0, 0.0), &mut sink);
        assert_eq!(outcome, PickOutcome::RejectedCoplanar);
        assert_eq!(collector.state(), CollectorState::Collecting);
        assert!(collector.points().is_empty());
        assert_eq!(sink.drain().last(), Some(&MarkerRequest::ClearAll));

        // A fresh attempt starts from index 0.
        let retry = collector.accept_point(DVec3::ZERO, &mut sink);
        assert_eq!(retry, PickOutcome::Accepted { index: 0, point: DVec3::ZERO });
    }

    #[test]
    fn escape_after_two_points_clears_buffer() {
        let mut collector = collecting();
        let mut sink = MarkerQueue::default();
        collector.accept_point(DVec3::ZERO, &mut sink);
        collector.accept_point(DVec3::X, &mut sink);

        assert!(!collector.handle_key_up(13));
        assert_eq!(collector.points().len(), 2);

        assert!(collector.handle_key_up(CANCEL_KEY_CODE));
        assert!(collector.points().is_empty());
        assert_eq!(collector.state(), CollectorState::Collecting);
    }

    #[test]
    fn escape_while_idle_is_not_consumed() {
        let mut collector = PointCollector::default();
        assert!(!collector.handle_key_up(CANCEL_KEY_CODE));
    }

    #[test]
    fn deactivation_clears_and_reactivation_starts_fresh() {
        let mut collector = collecting();
        let mut sink = MarkerQueue::default();
        for p in [DVec3::ZERO, DVec3::X, DVec3::Y] {
            collector.accept_point(p, &mut sink);
        }

        assert!(collector.deactivate());
        assert!(collector.points().is_empty());
        assert_eq!(collector.state(), CollectorState::Idle);
        assert!(!collector.deactivate());

        assert!(collector.activate());
        assert!(!collector.activate());
        assert!(collector.points().is_empty());
        assert_eq!(collector.state(), CollectorState::Collecting);
    }

    #[test]
    fn same_points_after_reset_give_identical_basis() {
        let points = [
            DVec3::new(0.3, 0.1, -2.0),
            DVec3::new(5.0, 0.7, -1.5),
            DVec3::new(1.2, 4.4, -2.2),
            DVec3::new(0.9, 1.0, 3.0),
        ];
        let mut sink = MarkerQueue::default();
        let mut solve = |collector: &mut PointCollector| {
            collector.activate();
            let mut last = PickOutcome::Ignored;
            for p in points {
                last = collector.accept_point(p, &mut sink);
            }
            last
        };

        let mut collector = PointCollector::default();
        let first = solve(&mut collector);
        let second = solve(&mut collector);
        assert!(matches!(first, PickOutcome::Solved(_)));
        assert_eq!(first, second);
    }
}
