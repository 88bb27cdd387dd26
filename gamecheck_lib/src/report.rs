//! Static HTML price report: a card grid with a detail modal.

use std::collections::HashMap;
use std::path::Path;

use html_escape::{encode_quoted_attribute, encode_text};
use serde::Serialize;

use crate::error::GameCheckError;

/// One game's prices across the stores plus its saved Metacritic score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub name: String,
    pub steam: String,
    pub playstation: String,
    pub amazon: String,
    pub metacritic: String,
}

impl PriceRow {
    /// Every store unavailable, used when a game's lookups failed outright.
    pub fn unavailable(name: &str, metacritic: &str) -> Self {
        Self {
            name: name.to_string(),
            steam: "N/A".to_string(),
            playstation: "N/A".to_string(),
            amazon: "N/A".to_string(),
            metacritic: metacritic.to_string(),
        }
    }

    pub fn has_any_price(&self) -> bool {
        [&self.steam, &self.playstation, &self.amazon]
            .iter()
            .any(|p| p.as_str() != "N/A")
    }
}

/// Cover image URLs keyed by game name, from a JSON object. A missing or
/// malformed file gives an empty map.
pub fn load_images(path: &Path) -> HashMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("no images from {}: {}", path.display(), e);
            return HashMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(images) => images,
        Err(e) => {
            tracing::warn!("ignoring {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

const STYLE: &str = "\
body{font-family:Arial,sans-serif;margin:20px;background:#f4f4f4;color:#333}\
h1{text-align:center;color:#2c3e50;margin-bottom:30px}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(230px,1fr));gap:25px}\
.card{background:#fff;border:1px solid #ddd;border-radius:10px;overflow:hidden;cursor:pointer;display:flex;flex-direction:column;box-shadow:0 4px 8px rgba(0,0,0,.08)}\
.card:hover{box-shadow:0 6px 12px rgba(0,0,0,.12)}\
.card .img-container{height:160px;background:#ececec;display:flex;align-items:center;justify-content:center;overflow:hidden}\
.card .img-container img{width:100%;height:100%;object-fit:cover}\
.placeholder-text{color:#aaa;font-style:italic}\
.card .title{padding:12px 15px;font-weight:700;text-align:center;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;border-top:1px solid #eee}\
.modal{display:none;position:fixed;z-index:1000;inset:0;background:rgba(0,0,0,.65);align-items:center;justify-content:center}\
.modal.open{display:flex}\
.modal-content{background:#fff;border-radius:10px;padding:25px 30px;max-width:480px;width:100%;position:relative}\
.modal-content img{max-width:100%;max-height:220px;display:block;margin:0 auto 20px}\
.details p{display:flex;justify-content:space-between;border-bottom:1px solid #f0f0f0;padding-bottom:10px}\
.close{position:absolute;top:15px;right:20px;font-size:1.8em;cursor:pointer;color:#aaa}";

const MODAL: &str = r#"<div id="modal" class="modal">
  <div class="modal-content">
    <span id="modal-close" class="close">&times;</span>
    <h2 id="modal-title"></h2>
    <img id="modal-img" src="" alt="">
    <div class="details">
      <p><strong>Steam:</strong> <span id="modal-steam"></span></p>
      <p><strong>PlayStation:</strong> <span id="modal-playstation"></span></p>
      <p><strong>Amazon:</strong> <span id="modal-amazon"></span></p>
      <p><strong>Metacritic:</strong> <span id="modal-metacritic"></span></p>
    </div>
  </div>
</div>
<script>
const modal = document.getElementById('modal');
const img = document.getElementById('modal-img');
const fields = ['steam', 'playstation', 'amazon', 'metacritic'];
document.querySelectorAll('.card').forEach(card => {
  card.addEventListener('click', () => {
    document.getElementById('modal-title').textContent = card.dataset.title;
    img.alt = card.dataset.title;
    img.src = card.dataset.img || '';
    img.style.display = card.dataset.img ? 'block' : 'none';
    fields.forEach(f => { document.getElementById('modal-' + f).textContent = card.dataset[f]; });
    modal.classList.add('open');
  });
});
const closeModal = () => modal.classList.remove('open');
document.getElementById('modal-close').addEventListener('click', closeModal);
modal.addEventListener('click', e => { if (e.target === modal) closeModal(); });
document.addEventListener('keydown', e => { if (e.key === 'Escape') closeModal(); });
</script>
"#;

fn write_card(html: &mut String, row: &PriceRow, image: Option<&str>) {
    let attr = |v: &str| encode_quoted_attribute(v).into_owned();
    let image = image.unwrap_or_default();
    let picture = if image.is_empty() {
        r#"<span class="placeholder-text">No Image</span>"#.to_string()
    } else {
        format!(r#"<img src="{}" alt="{}">"#, attr(image), attr(&row.name))
    };
    html.push_str(&format!(
        r#"<div class="card" data-title="{}" data-img="{}" data-steam="{}" data-playstation="{}" data-amazon="{}" data-metacritic="{}">
  <div class="img-container">{}</div>
  <div class="title" title="{}">{}</div>
</div>
"#,
        attr(&row.name),
        attr(image),
        attr(&row.steam),
        attr(&row.playstation),
        attr(&row.amazon),
        attr(&row.metacritic),
        picture,
        attr(&row.name),
        encode_text(&row.name),
    ));
}

/// Renders the full report page.
pub fn render_report(rows: &[PriceRow], images: &HashMap<String, String>) -> String {
    let mut html = String::with_capacity(4096 + rows.len() * 512);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Game prices</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body>\n<h1>Prices and Scores</h1>\n<div class=\"grid\">\n");
    for row in rows {
        write_card(&mut html, row, images.get(&row.name).map(String::as_str));
    }
    html.push_str("</div>\n");
    html.push_str(MODAL);
    html.push_str("</body></html>\n");
    html
}

pub fn write_report(
    path: &Path,
    rows: &[PriceRow],
    images: &HashMap<String, String>,
) -> Result<(), GameCheckError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_report(rows, images))?;
    tracing::info!("wrote report for {} games to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> PriceRow {
        PriceRow {
            name: name.to_string(),
            steam: "7.49 USD".to_string(),
            playstation: "$19.99".to_string(),
            amazon: "N/A".to_string(),
            metacritic: "92".to_string(),
        }
    }

    #[test]
    fn cards_carry_prices() {
        let html = render_report(&[row("Celeste")], &HashMap::new());
        assert!(html.contains(r#"data-title="Celeste""#));
        assert!(html.contains(r#"data-steam="7.49 USD""#));
        assert!(html.contains(r#"data-playstation="$19.99""#));
        assert!(html.contains(r#"data-metacritic="92""#));
        assert!(html.contains("No Image"));
        assert_eq!(html.matches(r#"<div class="card""#).count(), 1);
    }

    #[test]
    fn one_card_per_row_in_order() {
        let html = render_report(&[row("Hades"), row("Celeste"), row("Tunic")], &HashMap::new());
        assert_eq!(html.matches(r#"<div class="card""#).count(), 3);
        let hades = html.find(r#"data-title="Hades""#).unwrap();
        let celeste = html.find(r#"data-title="Celeste""#).unwrap();
        let tunic = html.find(r#"data-title="Tunic""#).unwrap();
        assert!(hades < celeste && celeste < tunic);
        assert!(html.trim_end().ends_with("</body></html>"));
    }

    #[test]
    fn names_are_escaped() {
        let html = render_report(&[row(r#"Tom & Jerry "<Chase>""#)], &HashMap::new());
        assert!(!html.contains("<Chase>"));
        assert!(html.contains("Tom &amp; Jerry"));
    }

    #[test]
    fn images_by_name() {
        let images: HashMap<String, String> =
            [("Celeste".to_string(), "https://img.example/celeste.jpg".to_string())].into();
        let html = render_report(&[row("Celeste"), row("Hades")], &images);
        assert!(html.contains(r#"<img src="https://img.example/celeste.jpg" alt="Celeste">"#));
        assert_eq!(html.matches("No Image").count(), 1);
    }

    #[test]
    fn images_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.json");
        std::fs::write(&path, r#"{"Hades": "h.png"}"#).unwrap();
        assert_eq!(load_images(&path).get("Hades").map(String::as_str), Some("h.png"));

        std::fs::write(&path, "not json").unwrap();
        assert!(load_images(&path).is_empty());
        assert!(load_images(&dir.path().join("missing.json")).is_empty());
    }

    #[test]
    fn any_price() {
        assert!(row("Celeste").has_any_price());
        assert!(!PriceRow::unavailable("Celeste", "92").has_any_price());
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");
        write_report(&path, &[row("Celeste")], &HashMap::new()).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}
