//! Static obstacle registry and collision queries
//!
//! Trees, huts and hills are vertical cylinders (tested in the ground
//! plane). Cover crates are boxes sitting on the ground. Every moving thing
//! asks the same registry, but with its own [`Probe`]: a padding radius,
//! whether the crate height matters, and a per-mover hut margin.

use glam::{Vec2, Vec3};

use crate::planar;

/// A cylindrical obstacle, infinitely tall for collision purposes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center on the ground plane (x, z)
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(x: f32, z: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, z),
            radius,
        }
    }

    /// Planar overlap with a disc of `pad` radius at `point`
    #[inline]
    fn overlaps(&self, point: Vec2, pad: f32) -> bool {
        point.distance(self.center) < self.radius + pad
    }
}

/// An axis-aligned crate resting on the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverBox {
    /// Footprint center on the ground plane (x, z)
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl CoverBox {
    pub const fn new(x: f32, z: f32, width: f32, height: f32, depth: f32) -> Self {
        Self {
            center: Vec2::new(x, z),
            width,
            height,
            depth,
        }
    }

    /// Footprint-only overlap, inflated by `pad`
    #[inline]
    fn overlaps_footprint(&self, point: Vec2, pad: f32) -> bool {
        let d = point - self.center;
        d.x.abs() < self.width / 2.0 + pad && d.y.abs() < self.depth / 2.0 + pad
    }

    /// Full 3D overlap, inflated by `pad` on every axis
    #[inline]
    fn overlaps_volume(&self, pos: Vec3, pad: f32) -> bool {
        let dy = pos.y - self.height / 2.0;
        self.overlaps_footprint(planar(pos), pad) && dy.abs() < self.height / 2.0 + pad
    }
}

/// How a particular kind of mover queries the registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Padding added to every obstacle
    pub radius: f32,
    /// Test crate height as well as footprint
    pub volumetric: bool,
    /// Extra padding on huts only
    pub hut_margin: f32,
}

impl Probe {
    /// Player and enemy footsteps: flat test, half-meter body
    pub const WALKER: Probe = Probe {
        radius: 0.5,
        volumetric: false,
        hut_margin: 0.0,
    };

    /// Rifle rounds can fly over low cover
    pub const BULLET: Probe = Probe {
        radius: 0.15,
        volumetric: true,
        hut_margin: 0.0,
    };

    /// Grenades also clip hut eaves sooner
    pub const GRENADE: Probe = Probe {
        radius: 0.25,
        volumetric: true,
        hut_margin: 0.2,
    };
}

/// Read-only level geometry shared by every simulator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Obstacles {
    pub trees: Vec<Circle>,
    pub huts: Vec<Circle>,
    pub hills: Vec<Circle>,
    pub covers: Vec<CoverBox>,
}

impl Obstacles {
    /// Open ground with nothing in the way
    pub fn empty() -> Self {
        Self::default()
    }

    /// The jungle village the game is played in
    pub fn village() -> Self {
        let tree = |x, z| Circle::new(x, z, 2.2);
        let hut = |x, z| Circle::new(x, z, 2.8);
        Self {
            trees: vec![
                // North-west grove
                tree(-20.0, -30.0),
                tree(-25.0, -28.0),
                tree(-22.0, -32.0),
                // North-east grove
                tree(18.0, -28.0),
                tree(22.0, -30.0),
                tree(20.0, -32.0),
                // West edge
                tree(-28.0, -5.0),
                tree(-30.0, 0.0),
                tree(-32.0, 5.0),
                tree(-29.0, 10.0),
                // East edge
                tree(28.0, -5.0),
                tree(30.0, 0.0),
                tree(32.0, 5.0),
                tree(29.0, 10.0),
                // Behind the village
                tree(-15.0, 15.0),
                tree(-18.0, 18.0),
                tree(15.0, 15.0),
                tree(18.0, 18.0),
            ],
            huts: vec![
                hut(-8.0, 5.0),
                hut(-12.0, 3.0),
                hut(10.0, 8.0),
                hut(8.0, 12.0),
                hut(0.0, 15.0),
            ],
            hills: vec![
                Circle::new(-15.0, -20.0, 2.8),
                Circle::new(10.0, -25.0, 3.3),
                Circle::new(20.0, 5.0, 2.5),
                Circle::new(-20.0, 10.0, 3.3),
                Circle::new(5.0, 20.0, 2.8),
            ],
            covers: vec![
                CoverBox::new(-5.0, -15.0, 2.0, 2.5, 3.0),
                CoverBox::new(12.0, -8.0, 2.5, 2.2, 2.0),
                CoverBox::new(-18.0, 0.0, 3.0, 2.0, 1.5),
                CoverBox::new(8.0, 8.0, 2.0, 2.8, 2.5),
                CoverBox::new(0.0, 12.0, 2.5, 2.0, 3.0),
            ],
        }
    }

    /// Does a mover described by `probe` at `pos` touch any obstacle?
    pub fn blocks(&self, pos: Vec3, probe: Probe) -> bool {
        let point = planar(pos);

        let circles = self.trees.iter().any(|c| c.overlaps(point, probe.radius))
            || self
                .huts
                .iter()
                .any(|c| c.overlaps(point, probe.radius + probe.hut_margin))
            || self.hills.iter().any(|c| c.overlaps(point, probe.radius));
        if circles {
            return true;
        }

        if probe.volumetric {
            self.covers.iter().any(|b| b.overlaps_volume(pos, probe.radius))
        } else {
            self.covers.iter().any(|b| b.overlaps_footprint(point, probe.radius))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_blocks_walker_inside_padded_radius() {
        let obstacles = Obstacles::village();
        // Tree at (-20, -30) r=2.2, walker pad 0.5 => 2.7
        assert!(obstacles.blocks(Vec3::new(-20.0, 1.7, -27.4), Probe::WALKER));
        assert!(!obstacles.blocks(Vec3::new(-20.0, 1.7, -27.2), Probe::WALKER));
    }

    #[test]
    fn test_circles_ignore_height() {
        let obstacles = Obstacles::village();
        // High above a hill is still a hit: cylinders are unbounded
        assert!(obstacles.blocks(Vec3::new(10.0, 50.0, -25.0), Probe::BULLET));
    }

    #[test]
    fn test_bullet_flies_over_low_cover_walker_does_not_pass() {
        let obstacles = Obstacles::village();
        // Crate at (-18, 0): 3 wide, 2 tall, 1.5 deep
        let above = Vec3::new(-18.0, 2.5, 0.0);
        assert!(!obstacles.blocks(above, Probe::BULLET));
        assert!(obstacles.blocks(above, Probe::WALKER));

        let through = Vec3::new(-18.0, 1.0, 0.0);
        assert!(obstacles.blocks(through, Probe::BULLET));
    }

    #[test]
    fn test_grenade_hut_margin() {
        let obstacles = Obstacles::village();
        // Hut at (-12, 3) r=2.8. Bullet reach 2.95, grenade reach 3.25
        let pos = Vec3::new(-12.0, 1.0, 3.0 - 3.1);
        assert!(!obstacles.blocks(pos, Probe::BULLET));
        assert!(obstacles.blocks(pos, Probe::GRENADE));
    }

    #[test]
    fn test_cover_footprint_padding() {
        let obstacles = Obstacles::village();
        // Crate at (12, -8) is 2.5 wide => half 1.25, walker pad 0.5
        assert!(obstacles.blocks(Vec3::new(13.7, 0.3, -8.0), Probe::WALKER));
        assert!(!obstacles.blocks(Vec3::new(13.8, 0.3, -8.0), Probe::WALKER));
    }

    #[test]
    fn test_open_ground_is_clear() {
        let obstacles = Obstacles::village();
        assert!(!obstacles.blocks(Vec3::new(0.0, 1.7, 5.0), Probe::WALKER));
        assert!(!Obstacles::empty().blocks(Vec3::ZERO, Probe::GRENADE));
    }
}
