use std::collections::{BTreeSet, HashMap};

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern};

/// Solid fill colors used by the report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FillColor {
  LightGreen,
  #[cfg_attr(not(test), allow(dead_code))]
  PaleBlue,
  Red,
  Green,
  BlueGrey,
}

impl FillColor {
  pub fn rgb(self) -> u32 {
    match self {
      FillColor::LightGreen => 0xCCFFCC,
      FillColor::PaleBlue => 0x99CCFF,
      FillColor::Red => 0xFF0000,
      FillColor::Green => 0x008000,
      FillColor::BlueGrey => 0x666699,
    }
  }

  pub fn color(self) -> Color {
    Color::RGB(self.rgb())
  }
}

/// Cell formatting options. Declaration order is catalog order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleOption {
  WrapText,
  /// Horizontal and vertical centering.
  CenterAlign,
  /// Top vertical alignment; overrides the vertical part of CenterAlign.
  TopAlign,
  Fill(FillColor),
  /// Thin border on all four sides.
  BorderAll,
  /// Literal text number format (`@`).
  #[cfg_attr(not(test), allow(dead_code))]
  FormatAsText,
}

/// Unordered set of style options; equal sets produce identical formats.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleSet(BTreeSet<StyleOption>);

impl StyleSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn union(&self, other: &StyleSet) -> StyleSet {
    StyleSet(self.0.union(&other.0).copied().collect())
  }

  pub fn contains(&self, option: StyleOption) -> bool {
    self.0.contains(&option)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Effective fill; with several fills the last in catalog order wins.
  pub fn fill(&self) -> Option<FillColor> {
    self.0.iter().rev().find_map(|o| match o {
      StyleOption::Fill(c) => Some(*c),
      _ => None,
    })
  }

  pub fn to_format(&self) -> Format {
    let mut format = Format::new();

    if self.contains(StyleOption::WrapText) {
      format = format.set_text_wrap();
    }
    if self.contains(StyleOption::CenterAlign) {
      format = format.set_align(FormatAlign::Center);
      if !self.contains(StyleOption::TopAlign) {
        format = format.set_align(FormatAlign::VerticalCenter);
      }
    }
    if self.contains(StyleOption::TopAlign) {
      format = format.set_align(FormatAlign::Top);
    }
    if let Some(fill) = self.fill() {
      format = format.set_background_color(fill.color()).set_pattern(FormatPattern::Solid);
    }
    if self.contains(StyleOption::BorderAll) {
      format = format.set_border(FormatBorder::Thin);
    }
    if self.contains(StyleOption::FormatAsText) {
      format = format.set_num_format("@");
    }

    format
  }
}

impl FromIterator<StyleOption> for StyleSet {
  fn from_iter<I: IntoIterator<Item = StyleOption>>(iter: I) -> Self {
    StyleSet(iter.into_iter().collect())
  }
}

impl<const N: usize> From<[StyleOption; N]> for StyleSet {
  fn from(options: [StyleOption; N]) -> Self {
    options.into_iter().collect()
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StyleId(usize);

impl StyleId {
  pub fn index(self) -> usize {
    self.0
  }
}

/// Interned style sets for one workbook.
#[derive(Debug, Default)]
pub struct StyleTable {
  sets: Vec<StyleSet>,
  index: HashMap<StyleSet, StyleId>,
}

impl StyleTable {
  pub fn intern(&mut self, set: StyleSet) -> StyleId {
    if let Some(id) = self.index.get(&set) {
      return *id;
    }
    let id = StyleId(self.sets.len());
    self.sets.push(set.clone());
    self.index.insert(set, id);
    id
  }

  pub fn get(&self, id: StyleId) -> Option<&StyleSet> {
    self.sets.get(id.0)
  }

  pub fn len(&self) -> usize {
    self.sets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sets.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &StyleSet> {
    self.sets.iter()
  }
}
