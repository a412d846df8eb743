use crate::chart::render_bar_chart;
use crate::models::{Mood, MoodCount};

pub const EMPTY_STATE: &str = "No moods logged today yet.";
pub const LOGGED_MESSAGE: &str = "Mood logged successfully!";

pub struct IndexPage<'a> {
    pub today_section: &'a str,
    pub logged: bool,
    pub auto_refresh: bool,
    pub refresh_secs: u64,
}

pub fn render_index(page: &IndexPage<'_>) -> String {
    let options = Mood::ALL
        .iter()
        .map(|mood| {
            format!(
                r#"<option value="{symbol}">{symbol} {label}</option>"#,
                symbol = mood.symbol(),
                label = mood.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    let status = if page.logged {
        format!(r#"<div class="status" id="status" data-type="ok">{LOGGED_MESSAGE}</div>"#)
    } else {
        r#"<div class="status" id="status"></div>"#.to_string()
    };

    INDEX_HTML
        .replace("{{MOOD_OPTIONS}}", &options)
        .replace("{{STATUS}}", &status)
        .replace("{{LOGGED}}", LOGGED_MESSAGE)
        .replace("{{REFRESH_CHECKED}}", if page.auto_refresh { "checked" } else { "" })
        .replace("{{REFRESH_VALUE}}", if page.auto_refresh { "1" } else { "" })
        .replace("{{REFRESH_SECS}}", &page.refresh_secs.to_string())
        // Last, so nothing inside the rendered section is treated as a placeholder.
        .replace("{{TODAY}}", page.today_section)
}

pub fn render_today(date: &str, counts: &[MoodCount], warning: Option<&str>) -> String {
    let mut html = String::new();

    if let Some(warning) = warning {
        html.push_str(&format!(
            r#"<div class="status" data-type="error">{}</div>"#,
            escape_html(warning)
        ));
    }

    if counts.is_empty() {
        html.push_str(&format!(r#"<p class="info">{EMPTY_STATE}</p>"#));
    } else {
        html.push_str(r#"<div class="chart-card">"#);
        html.push_str(&render_bar_chart(counts));
        html.push_str("</div>");
    }

    let total: u64 = counts.iter().map(|entry| entry.count).sum();
    html.push_str(&format!(
        r#"<p class="hint">{} &middot; {total} {} logged today (server time).</p>"#,
        escape_html(date),
        if total == 1 { "mood" } else { "moods" }
    ));
    html
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood of the Queue</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f8;
      --bg-2: #c9dcef;
      --ink: #25303b;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3ecf5 60%, #f5f8fb 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
    }

    form {
      display: grid;
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #6b645d;
    }

    select,
    input[type="text"] {
      font: inherit;
      padding: 12px 14px;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.18);
      background: white;
    }

    select {
      font-size: 1.2rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
      justify-self: start;
    }

    button:active {
      transform: scale(0.98);
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .mood-chart {
      width: 100%;
      display: block;
    }

    .mood-chart text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-title {
      font-size: 16px;
      font-weight: 600;
      fill: var(--accent-2);
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .chart-value {
      fill: var(--accent-2);
      font-size: 13px;
      font-weight: 600;
    }

    .chart-mood {
      font-size: 22px;
    }

    .info {
      margin: 0;
      padding: 16px 18px;
      border-radius: 14px;
      background: rgba(47, 72, 88, 0.06);
      color: var(--accent-2);
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .hint {
      margin: 8px 0 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    hr {
      border: none;
      border-top: 1px solid rgba(47, 72, 88, 0.12);
      margin: 0;
    }

    .refresh {
      display: flex;
      align-items: center;
      gap: 10px;
      font-size: 0.95rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>🧠 Mood of the Queue</h1>
      <p class="subtitle">Log how the ticket queue <em>feels</em> today.</p>
    </header>

    <section>
      <h2>1. Log a Mood</h2>
      <form id="mood-form" method="post" action="/moods">
        <label>
          Select a mood:
          <select name="mood" id="mood">
          {{MOOD_OPTIONS}}
          </select>
        </label>
        <label>
          Optional note:
          <input type="text" name="note" id="note" autocomplete="off" />
        </label>
        <input type="hidden" name="refresh" id="refresh-field" value="{{REFRESH_VALUE}}" />
        <button id="submit-btn" type="submit">Submit Mood</button>
      </form>
      {{STATUS}}
    </section>

    <section>
      <h2>2. Today's Mood Trends</h2>
      <div id="today">{{TODAY}}</div>
    </section>

    <hr />
    <label class="refresh">
      <input type="checkbox" id="auto-refresh" {{REFRESH_CHECKED}} />
      Auto-refresh every {{REFRESH_SECS}}s
    </label>
  </main>

  <script>
    const REFRESH_MS = {{REFRESH_SECS}} * 1000;
    const todayEl = document.getElementById('today');
    const statusEl = document.getElementById('status');
    const form = document.getElementById('mood-form');
    const submitBtn = document.getElementById('submit-btn');
    const refreshBox = document.getElementById('auto-refresh');
    const refreshField = document.getElementById('refresh-field');

    let refreshTimer = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const loadToday = async () => {
      const res = await fetch('/today');
      if (!res.ok) {
        throw new Error('Unable to load today\'s moods');
      }
      todayEl.innerHTML = await res.text();
    };

    const scheduleRefresh = () => {
      refreshTimer = setTimeout(async () => {
        try {
          await loadToday();
        } catch (err) {
          setStatus(err.message, 'error');
        } finally {
          if (refreshBox.checked) {
            scheduleRefresh();
          }
        }
      }, REFRESH_MS);
    };

    const cancelRefresh = () => {
      if (refreshTimer !== null) {
        clearTimeout(refreshTimer);
        refreshTimer = null;
      }
    };

    const syncRefresh = () => {
      cancelRefresh();
      refreshField.value = refreshBox.checked ? '1' : '';
      const url = new URL(window.location.href);
      url.searchParams.delete('logged');
      if (refreshBox.checked) {
        url.searchParams.set('refresh', '1');
        scheduleRefresh();
      } else {
        url.searchParams.delete('refresh');
      }
      window.history.replaceState(null, '', url);
    };

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      submitBtn.disabled = true;
      setStatus('Saving...', 'info');
      try {
        const res = await fetch('/api/moods', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            mood: document.getElementById('mood').value,
            note: document.getElementById('note').value
          })
        });
        if (!res.ok) {
          const msg = await res.text();
          throw new Error(msg || 'Request failed');
        }
        document.getElementById('note').value = '';
        setStatus('{{LOGGED}}', 'ok');
        await loadToday();
      } catch (err) {
        setStatus(err.message, 'error');
      } finally {
        submitBtn.disabled = false;
      }
    });

    refreshBox.addEventListener('change', syncRefresh);
    syncRefresh();
  </script>
</body>
</html>
"#;
