use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::access::AccessMode;
use crate::app::{App, AppMode, PreviewKey, TextInput};
use crate::constants::constants;
use crate::editor::EditorField;
use crate::graphics::{PreviewWidget, fit_to_area};
use crate::media;
use crate::theme::Theme;
use crate::view::{CardState, empty_message, format_created_at};

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(row);
  cell
}

/// Draw a cached preview into `area`. Returns false when the image isn't
/// available (still loading or unreadable).
fn render_preview(frame: &mut Frame, app: &mut App, key: &PreviewKey, area: Rect) -> bool {
  if area.is_empty() || app.previews.get(key).is_none() {
    return false;
  }
  let needs_resize = match app.previews.resized.get(key) {
    Some((w, h, _)) => *w != area.width || *h != area.height,
    None => true,
  };
  if needs_resize && let Some(image) = app.previews.get(key) {
    let resized = fit_to_area(image, area, app.display_mode);
    app.previews.resized.insert(key.clone(), (area.width, area.height, resized));
  }
  if let Some((_, _, resized)) = app.previews.resized.get(key) {
    frame.render_widget(PreviewWidget { image: resized, display_mode: app.display_mode }, area);
  }
  true
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, banner_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(8),
    Constraint::Min(5),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_banner(frame, app, banner_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_filter(frame, app, input_area);
  render_footer(frame, app, footer_area);

  match app.mode {
    AppMode::Login(target) => render_login(frame, app, target),
    AppMode::Editor => render_editor(frame, app),
    AppMode::ConfirmDelete => render_confirm_delete(frame, app),
    AppMode::BannerInput => render_banner_input(frame, app),
    AppMode::Browse | AppMode::Filter => {}
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let title_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
  let mut spans = vec![Span::styled(format!(" ▶ {} ", constants().app_name), title_style)];
  if let Some(playing) = &app.player.now_playing {
    let icon = if app.player.paused { "⏸" } else { "♪" };
    spans.push(Span::styled(format!(" {} {}", icon, playing.title), Style::default().fg(theme.status)));
  }
  frame.render_widget(Line::from(spans), area);

  let mode = app.access.mode();
  let badge_color = match mode {
    AccessMode::Admin => theme.admin,
    AccessMode::Spectator => theme.vip,
    AccessMode::Public => theme.muted,
  };
  let badge = format!(" {} ", mode.label());
  let version = format!(" v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(vec![
    Span::styled(badge.clone(), Style::default().fg(theme.key_fg).bg(badge_color).add_modifier(Modifier::BOLD)),
    Span::styled(version.clone(), Style::default().fg(theme.muted)),
  ]);
  let right_w = (badge.chars().count() + version.chars().count()) as u16;
  let right_area = Rect { x: area.x + area.width.saturating_sub(right_w), width: right_w.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_banner(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let mut block = rounded(theme);
  if app.access.mode() == AccessMode::Public {
    block = block.title(
      Line::from(Span::styled(" 🔓 LIBERAR VIP [u] ", Style::default().fg(theme.vip).add_modifier(Modifier::BOLD)))
        .right_aligned(),
    );
  }
  let inner = block.inner(area);
  frame.render_widget(block, area);

  if !render_preview(frame, app, &PreviewKey::Banner, inner) {
    let banner = truncate_str(&media::describe(app.catalog.banner()), inner.width as usize);
    let text = vec![
      Line::from(Span::styled(
        constants().app_name.as_str(),
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
      )),
      Line::from(Span::styled(banner, Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
  }
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if app.visible_entries().is_empty() {
    render_empty(frame, app, area);
    return;
  }
  let [list_area, detail_area] =
    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
  render_list(frame, app, list_area);
  render_detail(frame, app, detail_area);
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (headline, hint) = empty_message(&app.filter.value, app.access.mode());
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(headline, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled(hint, Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(rounded(theme)), area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let manage = app.access.can_manage();
  // Area minus 2 borders minus 2 chars for the highlight symbol ("▶ ").
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.list_state.selected();

  let items: Vec<ListItem> = app
    .visible_entries()
    .into_iter()
    .enumerate()
    .map(|(i, entry)| {
      let card = app.card(&entry.id).unwrap_or_else(|| CardState::new(entry));
      let is_selected = Some(i) == selected;
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let heart = if card.liked { "♥" } else { "♡" };
      let mut right = format!("{} {}  {}", heart, card.like_count, format_created_at(entry.created_at));
      if manage && !entry.tags.is_empty() {
        right = format!("{}  {}", entry.tags.join(", "), right);
      }
      let right_w = right.chars().count();
      let mark = if card.saved { "★ " } else { "" };
      let title_max = inner_w.saturating_sub(right_w + 2 + mark.chars().count());
      let title = truncate_str(&entry.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + mark.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(mark, Style::default().fg(theme.status)),
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let count = items.len();
  let title = if app.filter.value.is_empty() {
    format!(" Catálogo ({}) ", count)
  } else {
    format!(" Catálogo ({} de {}) ", count, app.catalog.len())
  };
  let list = List::new(items)
    .block(rounded(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = rounded(theme).padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let Some(entry) = app.selected_entry().cloned() else { return };
  let card = app.card(&entry.id).unwrap_or_else(|| CardState::new(&entry));
  let [cover_area, info_area] = Layout::vertical([Constraint::Percentage(50), Constraint::Min(4)]).areas(inner);

  if !render_preview(frame, app, &PreviewKey::Cover(entry.id.clone()), cover_area) {
    let text = truncate_str(&media::describe(&entry.cover_url), cover_area.width as usize);
    frame.render_widget(
      Paragraph::new(Span::styled(text, Style::default().fg(theme.muted))).alignment(Alignment::Center),
      cover_area,
    );
  }

  let mut stats = vec![
    Span::styled(if card.liked { "♥ " } else { "♡ " }, Style::default().fg(theme.accent)),
    Span::styled(card.like_count.to_string(), Style::default().fg(theme.fg)),
  ];
  if app.access.can_manage() {
    stats.push(Span::styled(format!("   💬 {}", entry.comments), Style::default().fg(theme.fg)));
  }
  stats.push(Span::styled(format!("   ↗ {}", entry.shares), Style::default().fg(theme.fg)));
  if card.saved {
    stats.push(Span::styled("   ★ salvo", Style::default().fg(theme.status)));
  }

  let mut lines = vec![
    Line::from(Span::styled(entry.title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(Span::styled(format_created_at(entry.created_at), Style::default().fg(theme.muted))),
    Line::from(stats),
    Line::from(""),
  ];
  if app.access.can_manage() && !entry.tags.is_empty() {
    let tags: Vec<String> = entry.tags.iter().map(|t| format!("#{}", t)).collect();
    lines.push(Line::from(Span::styled(tags.join(" "), Style::default().fg(theme.accent))));
  }
  if !entry.description.is_empty() {
    lines.push(Line::from(Span::styled(entry.description.clone(), Style::default().fg(theme.fg))));
  }
  if !app.access.can_play() {
    lines.push(Line::from(""));
    let locked = "🔒 Conteúdo exclusivo. Enter para desbloquear.";
    lines.push(Line::from(Span::styled(locked, Style::default().fg(theme.vip))));
  }
  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), info_area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ✓ {}", info), Style::default().fg(theme.accent))
  } else {
    match app.player.get_last_mpv_status() {
      Some(status) => (format!(" ♪ {}", status), Style::default().fg(theme.status)),
      None => (" Pronto".to_string(), Style::default().fg(theme.muted)),
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Draw a single-line input with horizontal scrolling; `mask` hides the text.
fn render_text_input(
  frame: &mut Frame,
  theme: &Theme,
  input: &mut TextInput,
  block: Block,
  area: Rect,
  focused: bool,
  mask: bool,
) {
  let shown: String = if mask { "•".repeat(input.value.chars().count()) } else { input.value.clone() };
  let inner = block.inner(area);
  let inner_w = (inner.width as usize).max(1);
  let cursor_col = display_width(&shown, input.cursor);

  if cursor_col < input.scroll {
    input.scroll = cursor_col;
  } else if cursor_col >= input.scroll + inner_w {
    input.scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let scroll = input.scroll;
  let visible: String = shown
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  frame.render_widget(Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(block), area);

  if focused {
    let cursor_x = inner.x + (cursor_col - scroll) as u16;
    frame.set_cursor_position((cursor_x, inner.y));
  }
}

fn input_block(theme: &Theme, title: String, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
    .padding(Padding::horizontal(1))
}

fn render_filter(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Filter;
  let block = input_block(theme, " Buscar por título ou tag ".to_string(), focused);
  render_text_input(frame, theme, &mut app.filter, block, area, focused, false);
}

fn render_login(frame: &mut Frame, app: &mut App, target: AccessMode) {
  let theme = app.theme();
  let area = centered(frame.area(), 50.min(frame.area().width), 8);
  frame.render_widget(Clear, area);

  let (title, prompt) = match target {
    AccessMode::Spectator => (" Acesso VIP ", "Digite a frase de acesso:"),
    _ => (" Acesso Admin ", "Digite a senha de administrador:"),
  };
  let block = rounded(theme)
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .style(Style::default().bg(theme.bg));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [prompt_area, field_area, error_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Length(3), Constraint::Length(1)]).areas(inner);
  frame.render_widget(Paragraph::new(Span::styled(prompt, Style::default().fg(theme.fg))), prompt_area);
  let field = input_block(theme, String::new(), true);
  render_text_input(frame, theme, &mut app.password, field, field_area, true, true);
  if let Some(err) = &app.last_error {
    frame.render_widget(Paragraph::new(Span::styled(err.as_str(), Style::default().fg(theme.error))), error_area);
  }
}

fn render_editor(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let area = centered(frame.area(), 70.min(frame.area().width), 15);
  frame.render_widget(Clear, area);

  let block = rounded(theme)
    .title(" Adicionar vídeo ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .style(Style::default().bg(theme.bg));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [video_area, cover_area, title_area, note_area, hint_area] = Layout::vertical([
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(inner);

  let submitting = app.editor.is_submitting();
  let fields = [(EditorField::Video, video_area), (EditorField::Cover, cover_area), (EditorField::Title, title_area)];
  for (field, field_area) in fields {
    let focused = field == app.editor.focus && !submitting;
    let block = input_block(theme, format!(" {} ", field.label()), focused);
    if field == app.editor.focus {
      render_text_input(frame, theme, &mut app.editor_input, block, field_area, focused, false);
    } else {
      let value = match field {
        EditorField::Video => app.editor.video_input.clone(),
        EditorField::Cover if app.editor.cover_input.is_empty() => "(capa padrão)".to_string(),
        EditorField::Cover => app.editor.cover_input.clone(),
        EditorField::Title => app.editor.title.clone(),
      };
      let shown = truncate_str(&value, block.inner(field_area).width as usize);
      frame.render_widget(Paragraph::new(shown).style(Style::default().fg(theme.muted)).block(block), field_area);
    }
  }

  let note = if submitting {
    Span::styled("⏳ Enviando… a IA está gerando o resumo e as tags.", Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    Span::styled(err.clone(), Style::default().fg(theme.error))
  } else if !app.editor.can_submit() && app.editor_input.value.is_empty() {
    Span::styled("Informe o vídeo e o título para enviar.", Style::default().fg(theme.muted))
  } else {
    Span::styled("Resumo e tags são gerados automaticamente.", Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(note), note_area);
  let hint = Span::styled("Tab próximo campo · Enter enviar · Esc cancelar", Style::default().fg(theme.muted));
  frame.render_widget(Paragraph::new(hint), hint_area);
}

fn render_confirm_delete(frame: &mut Frame, app: &App) {
  let theme = app.theme();
  let Some(pending) = &app.pending_removal else { return };
  let area = centered(frame.area(), 56.min(frame.area().width), 6);
  frame.render_widget(Clear, area);

  let text = vec![
    Line::from(Span::styled(
      format!("Remover \"{}\"?", truncate_str(pending.title(), 40)),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled("y confirma · qualquer outra tecla cancela", Style::default().fg(theme.muted))),
  ];
  let block = rounded(theme)
    .title(" Excluir vídeo ")
    .title_style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
    .style(Style::default().bg(theme.bg));
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
}

fn render_banner_input(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let area = centered(frame.area(), 70.min(frame.area().width), 8);
  frame.render_widget(Clear, area);

  let block = rounded(theme)
    .title(" Alterar banner ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .style(Style::default().bg(theme.bg));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [current_area, field_area, error_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Length(3), Constraint::Length(1)]).areas(inner);
  let current = format!("Atual: {}", media::describe(app.catalog.banner()));
  frame.render_widget(
    Paragraph::new(Span::styled(truncate_str(&current, current_area.width as usize), Style::default().fg(theme.muted))),
    current_area,
  );
  let field = input_block(theme, " Caminho da imagem ".to_string(), true);
  render_text_input(frame, theme, &mut app.banner_input, field, field_area, true, false);
  if let Some(err) = &app.last_error {
    frame.render_widget(Paragraph::new(Span::styled(err.as_str(), Style::default().fg(theme.error))), error_area);
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let mode = app.access.mode();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Browse => {
      let play_label = if mode.can_play() { "Assistir" } else { "Desbloquear" };
      let mut k = vec![("Enter", play_label), ("/", "Buscar"), ("l", "Curtir"), ("s", "Salvar"), ("c", "Compartilhar")];
      if is_playing {
        let pause_label = if app.player.paused { "Retomar" } else { "Pausar" };
        k.push(("Space", pause_label));
        k.push(("f", "Tela cheia"));
        k.push(("^s", "Parar"));
      }
      if mode.can_manage() {
        k.push(("a", "Adicionar"));
        k.push(("d", "Excluir"));
        k.push(("b", "Banner"));
      }
      k.push(("v", if mode == AccessMode::Spectator { "Sair VIP" } else { "VIP" }));
      k.push(("^a", if mode == AccessMode::Admin { "Sair Admin" } else { "Admin" }));
      k.push(("^t", "Tema"));
      k.push(("Esc", "Sair"));
      k
    }
    AppMode::Filter => vec![("Enter", "Aplicar"), ("↑/↓", "Navegar"), ("Esc", "Limpar")],
    AppMode::Login(_) => vec![("Enter", "Entrar"), ("Esc", "Cancelar")],
    AppMode::Editor => vec![("Tab", "Próximo"), ("Enter", "Enviar"), ("Esc", "Cancelar")],
    AppMode::ConfirmDelete => vec![("y", "Confirmar"), ("qualquer", "Cancelar")],
    AppMode::BannerInput => vec![("Enter", "Salvar"), ("Esc", "Cancelar")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} · {} ", app.display_mode.label().to_lowercase(), theme.name);
  let label_w = theme_label.chars().count() as u16;
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(label_w), width: label_w.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("abc", 2), 2);
    assert_eq!(display_width("日本", 2), 4);
  }

  #[test]
  fn truncate_adds_ellipsis() {
    assert_eq!(truncate_str("Praia do Forte", 20), "Praia do Forte");
    assert_eq!(truncate_str("Praia do Forte", 6), "Praia…");
  }

  #[test]
  fn centered_rect_stays_inside() {
    let outer = Rect::new(0, 0, 100, 40);
    let inner = centered(outer, 50, 8);
    assert_eq!((inner.width, inner.height), (50, 8));
    assert_eq!((inner.x, inner.y), (25, 16));
  }
}
