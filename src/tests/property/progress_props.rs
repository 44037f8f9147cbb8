use proptest::prelude::*;

use crate::core::ambient::ProgressAnimation;

proptest! {
    #[test]
    fn ends_exactly_on_target(target in 0.0f64..=100.0, steps in 1u32..200) {
        let frames: Vec<_> = ProgressAnimation::new(target, steps).collect();
        prop_assert!(!frames.is_empty());
        prop_assert_eq!(frames.last().unwrap().width, target);
    }

    #[test]
    fn never_overshoots_or_goes_back(target in 0.0f64..=100.0, steps in 1u32..200) {
        let mut previous = 0.0;
        for frame in ProgressAnimation::new(target, steps) {
            prop_assert!(frame.width <= target);
            prop_assert!(frame.width >= previous);
            previous = frame.width;
        }
    }

    #[test]
    fn frame_count_matches_steps(target in 0.1f64..=100.0, steps in 1u32..200) {
        let animation = ProgressAnimation::new(target, steps);
        prop_assert_eq!(animation.size_hint(), (steps as usize, Some(steps as usize)));
        prop_assert_eq!(animation.count(), steps as usize);
    }
}
