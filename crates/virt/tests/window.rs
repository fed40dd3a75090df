#![forbid(unsafe_code)]

use lager_virt::{plan_window, RowLayout, Viewport, WindowPlan};

fn covers(plan: &WindowPlan, scroll: f32, view_h: f32) -> bool {
    if plan.rows.is_empty() {
        return false;
    }
    let first = plan.rows.first().unwrap();
    let last = plan.rows.last().unwrap();
    first.offset <= scroll && last.offset + last.height >= scroll + view_h
}

#[test]
fn empty_row_set_yields_empty_plan() {
    let plan = plan_window(&RowLayout::uniform(0), &Viewport::new(600.0, 0.0));
    assert!(plan.is_empty());
    assert_eq!(plan.total_height, 0.0);
    assert!(plan.rows.is_empty());
}

#[test]
fn window_covers_the_viewport_at_any_scroll_offset() {
    let layout = RowLayout::Uniform { count: 5000, row_height: 56.0 };
    let view_h = 600.0;
    let total = layout.total_height();
    let max_scroll = total - view_h;

    let mut scroll = 0.0f32;
    while scroll <= max_scroll {
        let vp = Viewport { height: view_h, scroll_offset: scroll, overscan: 0 };
        let plan = plan_window(&layout, &vp);
        assert!(plan.start < plan.end);
        assert!(plan.end <= 5000);
        assert!(covers(&plan, scroll, view_h), "not covered at scroll={}", scroll);
        scroll += 37.5; // a stride that never lines up with row boundaries
    }
}

#[test]
fn overscan_expands_and_clamps() {
    let layout = RowLayout::Uniform { count: 100, row_height: 10.0 };

    // top of the list: no negative start
    let top = plan_window(&layout, &Viewport { height: 50.0, scroll_offset: 0.0, overscan: 10 });
    assert_eq!(top.start, 0);
    assert_eq!(top.end, 15); // 5 visible + 10 overscan below

    // bottom of the list: end clamps to N
    let bottom = plan_window(&layout, &Viewport { height: 50.0, scroll_offset: 950.0, overscan: 10 });
    assert_eq!(bottom.end, 100);
    assert_eq!(bottom.start, 85);

    // oversized overscan materializes everything, still in range
    let all = plan_window(&layout, &Viewport { height: 50.0, scroll_offset: 400.0, overscan: 1000 });
    assert_eq!((all.start, all.end), (0, 100));

    // even usize::MAX must not overflow the range arithmetic
    let extreme =
        plan_window(&layout, &Viewport { height: 50.0, scroll_offset: 400.0, overscan: usize::MAX });
    assert_eq!((extreme.start, extreme.end), (0, 100));
}

#[test]
fn total_height_is_independent_of_the_window() {
    let layout = RowLayout::Uniform { count: 5000, row_height: 56.0 };
    let small = plan_window(&layout, &Viewport { height: 100.0, scroll_offset: 0.0, overscan: 0 });
    let large = plan_window(&layout, &Viewport { height: 5000.0, scroll_offset: 0.0, overscan: 50 });
    assert_eq!(small.total_height, 5000.0 * 56.0);
    assert_eq!(small.total_height, large.total_height);
    assert!(small.rows.len() < large.rows.len());
}

#[test]
fn per_row_offsets_are_prefix_sums() {
    let heights = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let layout = RowLayout::PerRow(heights.clone());
    let plan = plan_window(&layout, &Viewport { height: 150.0, scroll_offset: 0.0, overscan: 0 });
    assert_eq!(plan.start, 0);
    assert_eq!(plan.end, 5);
    let offsets: Vec<f32> = plan.rows.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0.0, 10.0, 30.0, 60.0, 100.0]);
    assert_eq!(plan.total_height, 150.0);
}

#[test]
fn per_row_window_starts_at_the_right_row() {
    let layout = RowLayout::PerRow(vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    // scroll 35 lands inside row 2 (spans 30..60)
    let plan = plan_window(&layout, &Viewport { height: 10.0, scroll_offset: 35.0, overscan: 0 });
    assert_eq!(plan.start, 2);
    assert!(covers(&plan, 35.0, 10.0));
}

#[test]
fn stale_scroll_offset_is_clamped() {
    let layout = RowLayout::Uniform { count: 10, row_height: 10.0 };
    // rows shrank since the frontend last measured; offset is way past the end
    let plan = plan_window(&layout, &Viewport { height: 50.0, scroll_offset: 9999.0, overscan: 0 });
    assert!(plan.end <= 10);
    assert!(plan.start < plan.end);
    assert!(covers(&plan, layout.total_height() - 50.0, 50.0));
}

#[test]
fn planning_is_deterministic() {
    let layout = RowLayout::PerRow((0..200).map(|i| 10.0 + (i % 7) as f32).collect());
    let vp = Viewport { height: 300.0, scroll_offset: 917.0, overscan: 5 };
    assert_eq!(plan_window(&layout, &vp), plan_window(&layout, &vp));
}
