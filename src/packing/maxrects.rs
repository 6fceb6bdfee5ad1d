use super::Rect;
use crate::cli::PackingHeuristic;

/// MaxRects bin packer implementation
pub struct MaxRectsPacker {
    bin_width: u32,
    bin_height: u32,
    free_rects: Vec<Rect>,
    used_rects: Vec<Rect>,
}

/// Placement score, lower is better. Position breaks ties so equal scores
/// always resolve to the same free rectangle.
type Score = (i64, i64, u32, u32);

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32) -> Self {
        let initial_rect = Rect::new(0, 0, width, height);
        Self {
            bin_width: width,
            bin_height: height,
            free_rects: vec![initial_rect],
            used_rects: Vec::new(),
        }
    }

    /// Try to insert a rectangle with the given dimensions
    /// Returns the placed rectangle if successful
    pub fn insert(&mut self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        let best_rect = self.find_position(width, height, heuristic)?;
        self.place_rect(best_rect);
        Some(best_rect)
    }

    fn find_position(&self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        let mut best_score: Option<Score> = None;
        let mut best_rect = None;

        for free_rect in &self.free_rects {
            if width <= free_rect.width && height <= free_rect.height {
                let (primary, secondary) = self.score_rect(free_rect, width, height, heuristic);
                let score = (primary, secondary, free_rect.y, free_rect.x);
                if best_score.is_none_or(|best| score < best) {
                    best_score = Some(score);
                    best_rect = Some(Rect::new(free_rect.x, free_rect.y, width, height));
                }
            }
        }

        best_rect
    }

    fn score_rect(
        &self,
        free_rect: &Rect,
        width: u32,
        height: u32,
        heuristic: PackingHeuristic,
    ) -> (i64, i64) {
        let leftover_h = i64::from(free_rect.width - width);
        let leftover_v = i64::from(free_rect.height - height);
        let short = leftover_h.min(leftover_v);
        let long = leftover_h.max(leftover_v);

        match heuristic {
            // `Best` is resolved by the caller; score it like the default
            PackingHeuristic::BestShortSideFit | PackingHeuristic::Best => (short, long),
            PackingHeuristic::BestLongSideFit => (long, short),
            PackingHeuristic::BestAreaFit => {
                let leftover_area = free_rect.area() as i64 - i64::from(width) * i64::from(height);
                (leftover_area, short)
            }
            PackingHeuristic::BottomLeft => {
                let top = i64::from(free_rect.y + height);
                let left = i64::from(free_rect.x);
                (top, left)
            }
            PackingHeuristic::ContactPoint => {
                let contact = self.contact_score(&Rect::new(free_rect.x, free_rect.y, width, height));
                (-contact, short)
            }
        }
    }

    /// Length of the candidate's edges touching the bin border or placed rectangles
    fn contact_score(&self, node: &Rect) -> i64 {
        let mut score = 0u64;

        if node.x == 0 || node.right() == self.bin_width {
            score += u64::from(node.height);
        }
        if node.y == 0 || node.bottom() == self.bin_height {
            score += u64::from(node.width);
        }

        for used in &self.used_rects {
            if node.x == used.right() || node.right() == used.x {
                score += u64::from(overlap_1d(node.y, node.bottom(), used.y, used.bottom()));
            }
            if node.y == used.bottom() || node.bottom() == used.y {
                score += u64::from(overlap_1d(node.x, node.right(), used.x, used.right()));
            }
        }

        i64::try_from(score).unwrap_or(i64::MAX)
    }

    fn place_rect(&mut self, rect: Rect) {
        let mut new_rects = Vec::new();

        self.free_rects.retain(|free_rect| {
            if !rect.intersects(free_rect) {
                return true;
            }

            // Split the free rectangle around the placed rectangle
            // Left portion
            if rect.x > free_rect.x {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    rect.x - free_rect.x,
                    free_rect.height,
                ));
            }

            // Right portion
            if rect.right() < free_rect.right() {
                new_rects.push(Rect::new(
                    rect.right(),
                    free_rect.y,
                    free_rect.right() - rect.right(),
                    free_rect.height,
                ));
            }

            // Top portion
            if rect.y > free_rect.y {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    free_rect.width,
                    rect.y - free_rect.y,
                ));
            }

            // Bottom portion
            if rect.bottom() < free_rect.bottom() {
                new_rects.push(Rect::new(
                    free_rect.x,
                    rect.bottom(),
                    free_rect.width,
                    free_rect.bottom() - rect.bottom(),
                ));
            }

            false
        });

        self.free_rects.extend(new_rects);
        self.prune_free_rects();
        self.used_rects.push(rect);
    }

    fn prune_free_rects(&mut self) {
        // Remove rectangles that are fully contained within others
        let mut i = 0;
        while i < self.free_rects.len() {
            let mut j = i + 1;
            while j < self.free_rects.len() {
                if self.free_rects[i].contains(&self.free_rects[j]) {
                    self.free_rects.remove(j);
                } else if self.free_rects[j].contains(&self.free_rects[i]) {
                    self.free_rects.remove(i);
                    j = i + 1;
                    continue;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
}

fn overlap_1d(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> u32 {
    a_end.min(b_end).saturating_sub(a_start.max(b_start))
}
