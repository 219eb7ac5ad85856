use crate::engine::Rect;
use crate::theme::Theme;
use crate::words::WordStore;
use anyhow::Result;
use std::path::Path;

/// Assemble the SVG document for a placed word store. `debug_rects` (mask
/// and placement boxes) get stroked on top when provided.
pub fn render_svg(
    words: &WordStore,
    theme: &Theme,
    width: f32,
    height: f32,
    debug_rects: Option<&[Rect]>,
) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for index in words.placed() {
        let placement = words.placement(index).expect("placed index");
        let cx = placement.x + placement.width / 2.0;
        let cy = placement.y + placement.height / 2.0;
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            words.font_size(index),
            theme.color(words.color_index(index)),
            escape_xml(words.word(index))
        ));
    }

    if let Some(rects) = debug_rects {
        for rect in rects {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#FF00AA\" stroke-width=\"0.8\"/>",
                rect.x(),
                rect.y(),
                rect.width(),
                rect.height()
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizingFunction;
    use crate::words::Placement;

    fn placed_store() -> WordStore {
        let mut words = WordStore::new();
        words.push("alpha", 10, 0);
        words.push("<beta>", 5, 1);
        words
            .assign_sizes(SizingFunction::Sqrt, 10.0, 48.0)
            .unwrap();
        words.record_placement(
            0,
            Placement {
                x: 100.0,
                y: 200.0,
                width: 80.0,
                height: 30.0,
            },
        );
        words.record_placement(
            1,
            Placement {
                x: 300.0,
                y: 100.0,
                width: 60.0,
                height: 20.0,
            },
        );
        words
    }

    #[test]
    fn svg_contains_every_placed_word() {
        let svg = render_svg(&placed_store(), &Theme::modern(), 800.0, 600.0, None);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("alpha"));
        assert!(svg.contains("&lt;beta&gt;"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn unplaced_words_are_omitted() {
        let mut words = WordStore::new();
        words.push("ghost", 1, 0);
        words
            .assign_sizes(SizingFunction::Linear, 10.0, 48.0)
            .unwrap();
        let svg = render_svg(&words, &Theme::modern(), 800.0, 600.0, None);
        assert!(!svg.contains("ghost"));
    }

    #[test]
    fn debug_rects_are_stroked() {
        let rects = [Rect::new(350.0, 200.0, 600.0, 250.0)];
        let svg = render_svg(
            &placed_store(),
            &Theme::modern(),
            800.0,
            600.0,
            Some(&rects),
        );
        assert!(svg.contains("stroke=\"#FF00AA\""));
    }
}
