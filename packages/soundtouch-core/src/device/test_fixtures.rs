//! Sample device responses shared by parser and controller tests.

pub const INFO: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<info deviceID="689E19B8BB8A">
  <name>Living Room</name>
  <type>SoundTouch 10</type>
  <margeAccountUUID>3230304</margeAccountUUID>
  <components>
    <component>
      <componentCategory>SCM</componentCategory>
      <softwareVersion>27.0.6.46330.5043500</softwareVersion>
    </component>
  </components>
  <networkInfo type="SCM">
    <macAddress>689E19B8BB8A</macAddress>
    <ipAddress>10.0.0.5</ipAddress>
  </networkInfo>
</info>"#;

pub const VOLUME: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<volume deviceID="689E19B8BB8A">
  <targetvolume>32</targetvolume>
  <actualvolume>32</actualvolume>
  <muteenabled>false</muteenabled>
</volume>"#;

pub const VOLUME_MUTED: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<volume deviceID="689E19B8BB8A">
  <targetvolume>55</targetvolume>
  <actualvolume>55</actualvolume>
  <muteenabled>true</muteenabled>
</volume>"#;

pub const NOW_PLAYING_RADIO: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<nowPlaying deviceID="689E19B8BB8A" source="TUNEIN" sourceAccount="">
  <ContentItem source="TUNEIN" type="stationurl" location="/v1/playback/station/s24861" sourceAccount="" isPresetable="true">
    <itemName>Jazz &amp; Blues FM</itemName>
    <containerArt>http://cdn-radiotime-logos.tunein.com/s24861q.png</containerArt>
  </ContentItem>
  <track>So What</track>
  <artist>Miles Davis</artist>
  <album></album>
  <stationName>Jazz &amp; Blues FM</stationName>
  <art artImageStatus="IMAGE_PRESENT">http://cdn-radiotime-logos.tunein.com/s24861q.png</art>
  <favoriteEnabled />
  <playStatus>PLAY_STATE</playStatus>
  <streamType>RADIO_STREAMING</streamType>
</nowPlaying>"#;

pub const NOW_PLAYING_STANDBY: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<nowPlaying deviceID="689E19B8BB8A" source="STANDBY">
  <ContentItem source="STANDBY" isPresetable="false" />
</nowPlaying>"#;

pub const PRESETS: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<presets>
  <preset id="1" createdOn="1509027375" updatedOn="1509027375">
    <ContentItem source="TUNEIN" type="stationurl" location="/v1/playback/station/s33828" sourceAccount="" isPresetable="true">
      <itemName>K-LOVE Radio</itemName>
      <containerArt>http://cdn-profiles.tunein.com/s33828/images/logoq.png</containerArt>
    </ContentItem>
  </preset>
  <preset id="3" createdOn="1509027375" updatedOn="1509027375">
    <ContentItem source="TUNEIN" type="stationurl" location="/v1/playback/station/s24861" sourceAccount="" isPresetable="true">
      <itemName>Jazz &amp; Blues FM</itemName>
    </ContentItem>
  </preset>
  <preset id="9">
    <ContentItem source="TUNEIN" location="s1"><itemName>Out of range</itemName></ContentItem>
  </preset>
</presets>"#;

pub const STATUS_OK: &str = r#"<?xml version="1.0" encoding="UTF-8" ?><status>/select</status>"#;

pub const ERROR_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<errors deviceID="689E19B8BB8A">
  <error value="1019" name="CLIENT_XML_ERROR" severity="Unknown">1019</error>
</errors>"#;
