/// Eighth-block characters, empty to full
const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Bar of exactly `width` cells filled to `percentage`, with sub-cell
/// resolution at the edge
pub fn render_bar(percentage: f64, width: usize) -> String {
    let percentage = percentage.clamp(0.0, 100.0);
    let filled = (percentage / 100.0) * width as f64;
    let full = (filled.floor() as usize).min(width);
    let partial = ((filled - full as f64) * 8.0).round() as usize;

    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n(BLOCKS[8], full));
    if full < width && partial > 0 {
        bar.push(BLOCKS[partial.min(8)]);
    }
    let drawn = bar.chars().count();
    bar.extend(std::iter::repeat_n(' ', width - drawn));
    bar
}

/// Short block sweeping back and forth, for work of unknown size
pub fn pulse_bar(frame: usize, width: usize) -> String {
    let block = (width / 6).max(1).min(width);
    let travel = width - block;
    let pos = if travel == 0 {
        0
    } else {
        let step = frame % (2 * travel);
        if step <= travel { step } else { 2 * travel - step }
    };

    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n(' ', pos));
    bar.extend(std::iter::repeat_n(BLOCKS[8], block));
    bar.extend(std::iter::repeat_n(' ', width - pos - block));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar_empty() {
        let bar = render_bar(0.0, 10);
        assert_eq!(bar.chars().count(), 10);
        assert!(bar.chars().all(|c| c == ' '));
    }

    #[test]
    fn test_render_bar_full() {
        let bar = render_bar(100.0, 10);
        assert_eq!(bar.chars().count(), 10);
        assert!(bar.chars().all(|c| c == '█'));
    }

    #[test]
    fn test_render_bar_partial_cell() {
        let bar = render_bar(55.0, 10);
        assert_eq!(bar.chars().count(), 10);
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), 5);
        assert_eq!(bar.chars().nth(5), Some('▌'));
    }

    #[test]
    fn test_render_bar_zero_width() {
        assert_eq!(render_bar(50.0, 0), "");
    }

    #[test]
    fn test_pulse_bar_stays_in_bounds() {
        for frame in 0..50 {
            let bar = pulse_bar(frame, 12);
            assert_eq!(bar.chars().count(), 12);
            assert_eq!(bar.chars().filter(|&c| c == '█').count(), 2);
        }
        assert_eq!(pulse_bar(3, 0), "");
    }
}
