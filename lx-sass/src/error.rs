use std::error::Error;

/// Write `root` and then everything in its `source()` chain, one per line.
pub fn write_to_fmt(
   f: &mut std::fmt::Formatter<'_>,
   root: &dyn Error,
) -> Result<(), std::fmt::Error> {
   writeln!(f, "{root}")?;

   let mut error = root.source();
   while let Some(nested) = error {
      writeln!(f, "  caused by: {nested}")?;
      error = nested.source();
   }

   Ok(())
}

/// Displays an error along with all of its causes.
pub struct Chain<'e>(pub &'e dyn Error);

impl std::fmt::Display for Chain<'_> {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      write_to_fmt(f, self.0)
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[derive(thiserror::Error, Debug)]
   #[error("could not build styles")]
   struct Outer {
      source: std::io::Error,
   }

   #[test]
   fn includes_every_cause() {
      let error = Outer {
         source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
      };
      assert_eq!(
         Chain(&error).to_string(),
         "could not build styles\n  caused by: no such file\n"
      );
   }
}
